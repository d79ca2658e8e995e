mod common;

use common::{buffer_desc, created, device, program_desc, reset, take_commands};
use gfx_platform::{
    record::{self, Call},
    ClearMask, Device, Command, Object, ProgramError, RenderPipelineDescriptor,
    RenderTargetDescriptor, Resource, ResourceKind, VertexBufferDescriptor,
};
use gft::{BufferUsage, Format, LoadDisposition};

#[test]
fn buffers_bind_to_their_usage_target() {
    let device = device();
    let cases = [
        (BufferUsage::Index, glow::ELEMENT_ARRAY_BUFFER),
        (BufferUsage::Vertex, glow::ARRAY_BUFFER),
        (BufferUsage::Uniform, glow::UNIFORM_BUFFER),
    ];
    for &(usage, target) in cases.iter() {
        reset(&device);
        let buffer = device.create_buffer(&buffer_desc(16, usage)).unwrap();
        let calls = device.context().take_calls();
        let raw = match created(&calls)[..] {
            [Object::Buffer(raw)] => raw,
            ref other => panic!("unexpected objects {:?}", other),
        };
        let commands: Vec<_> = calls
            .into_iter()
            .filter_map(|call| match call {
                Call::Command(command, _) => Some(command),
                _ => None,
            })
            .collect();
        assert_eq!(
            commands,
            vec![
                Command::BindBuffer {
                    target,
                    buffer: Some(raw),
                },
                Command::BufferData {
                    target,
                    size: 64,
                    usage: glow::STATIC_DRAW,
                },
                Command::BindBuffer {
                    target,
                    buffer: None,
                },
            ]
        );
        assert_eq!(buffer.usage(), usage);
        assert_eq!(buffer.byte_size(), 64);
        device.destroy_buffer(buffer);
    }
}

#[test]
fn mipmapped_texture_allocates_the_full_chain() {
    let device = device();
    reset(&device);
    let texture = device
        .create_texture(&gft::TextureDescriptor {
            format: Format::U8_RGBA_NORM,
            width: 256,
            height: 256,
            mipmapped: true,
            sample_count: 1,
        })
        .unwrap();
    assert_eq!(texture.mip_level_count(), 9);

    let commands = take_commands(&device);
    assert!(commands.contains(&Command::TexParameterI {
        target: glow::TEXTURE_2D,
        parameter: glow::TEXTURE_MAX_LEVEL,
        value: 8,
    }));
    assert!(commands.contains(&Command::TexStorage2d {
        target: glow::TEXTURE_2D,
        levels: 9,
        internal_format: glow::RGBA8,
        width: 256,
        height: 256,
    }));
    // uploads never touch the units of binding layouts
    assert!(commands.contains(&Command::ActiveTexture(
        glow::TEXTURE0 + gfx_platform::TRANSFER_TEXTURE_UNIT
    )));
}

#[test]
fn texture_without_mips_has_one_level() {
    let device = device();
    let texture = device
        .create_texture(&gft::TextureDescriptor {
            format: Format::F32_R,
            width: 800,
            height: 600,
            mipmapped: false,
            sample_count: 1,
        })
        .unwrap();
    assert_eq!(texture.mip_level_count(), 1);
}

#[test]
#[should_panic(expected = "Multisampled textures are not supported")]
fn multisampled_textures_are_rejected() {
    let device = device();
    let _ = device.create_texture(&gft::TextureDescriptor {
        format: Format::U8_RGBA_NORM,
        width: 4,
        height: 4,
        mipmapped: false,
        sample_count: 4,
    });
}

#[test]
fn sampler_parameters() {
    let device = device();
    reset(&device);
    let _sampler = device
        .create_sampler(&gft::SamplerDescriptor {
            wrap_s: gft::WrapMode::Clamp,
            wrap_t: gft::WrapMode::Mirror,
            min_filter: gft::TexFilterMode::Bilinear,
            mag_filter: gft::TexFilterMode::Point,
            mip_filter: gft::MipFilterMode::Linear,
            min_lod: 0.0,
            max_lod: 4.0,
        })
        .unwrap();
    let parameters: Vec<(u32, f32)> = take_commands(&device)
        .into_iter()
        .map(|command| match command {
            Command::SamplerParameterI {
                parameter, value, ..
            } => (parameter, value as f32),
            Command::SamplerParameterF {
                parameter, value, ..
            } => (parameter, value),
            other => panic!("unexpected command {:?}", other),
        })
        .collect();
    assert_eq!(
        parameters,
        vec![
            (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as f32),
            (glow::TEXTURE_WRAP_T, glow::MIRRORED_REPEAT as f32),
            (glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR as f32),
            (glow::TEXTURE_MAG_FILTER, glow::NEAREST as f32),
            (glow::TEXTURE_MIN_LOD, 0.0),
            (glow::TEXTURE_MAX_LOD, 4.0),
        ]
    );
}

#[test]
fn render_target_clear_mask_follows_load_dispositions() {
    let device = device();
    let color = device.create_color_attachment(64, 32, 4).unwrap();
    let depth = device.create_depth_stencil_attachment(64, 32, 4).unwrap();
    let mut desc = RenderTargetDescriptor {
        color_attachment: &color,
        depth_stencil_attachment: &depth,
        color_load_disposition: LoadDisposition::Clear,
        depth_load_disposition: LoadDisposition::Load,
        stencil_load_disposition: LoadDisposition::Clear,
        color_clear_color: gft::Color::OPAQUE_BLACK,
        depth_clear_value: 1.0,
        stencil_clear_value: 0,
    };
    let target = device.create_render_target(&desc).unwrap();
    assert_eq!(target.clear_mask(), ClearMask::COLOR | ClearMask::STENCIL);
    assert_eq!((target.width(), target.height()), (64, 32));

    desc.color_load_disposition = LoadDisposition::Load;
    desc.stencil_load_disposition = LoadDisposition::Load;
    let loading = device.create_render_target(&desc).unwrap();
    assert!(loading.clear_mask().is_empty());
}

#[test]
#[should_panic(expected = "different sample counts")]
fn render_target_attachments_must_agree() {
    let device = device();
    let color = device.create_color_attachment(64, 64, 4).unwrap();
    let depth = device.create_depth_stencil_attachment(64, 64, 1).unwrap();
    let _ = device.create_render_target(&RenderTargetDescriptor {
        color_attachment: &color,
        depth_stencil_attachment: &depth,
        color_load_disposition: LoadDisposition::Clear,
        depth_load_disposition: LoadDisposition::Clear,
        stencil_load_disposition: LoadDisposition::Clear,
        color_clear_color: gft::Color::TRANSPARENT_BLACK,
        depth_clear_value: 1.0,
        stencil_clear_value: 0,
    });
}

#[test]
fn programs_are_cached_by_descriptor() {
    let device = device();
    reset(&device);
    let desc = program_desc(&["ub_Scene", "ub_Object"], &["u_Texture"]);
    let first = device.create_program(&desc).unwrap();
    let second = device.create_program(&desc).unwrap();

    let programs = created(&device.context().take_calls());
    assert_eq!(programs.len(), 1);
    assert_eq!(device.program_cache().lock().len(), 1);
    assert_eq!(first.reflection(), second.reflection());
    assert_eq!(device.query_program(&first).uniform_buffers.len(), 2);
    assert_eq!(device.query_program(&first).uniform_buffers[1].name, "ub_Object");
}

#[test]
fn program_errors_are_reported() {
    let device = device();
    let mut desc = program_desc(&[], &[]);
    desc.fragment.clear();
    match device.create_program(&desc) {
        Err(ProgramError::Compilation(_)) => {}
        other => panic!("unexpected result {:?}", other),
    }
    assert!(device.program_cache().lock().is_empty());
}

#[test]
fn exit_releases_programs_once_the_cache_is_not_shared() {
    fn deletes_a_program(calls: &[Call]) -> bool {
        calls
            .iter()
            .any(|call| matches!(call, Call::Delete(Object::Program(_))))
    }

    let first = device();
    let program = first.create_program(&program_desc(&[], &[])).unwrap();
    first.destroy_program(program);
    let second = Device::with_program_cache(
        record::Context::new(),
        &Default::default(),
        first.program_cache(),
    );
    assert_eq!(second.program_cache().lock().len(), 1);

    let first_context = first.exit();
    assert!(!deletes_a_program(&first_context.calls()));
    let second_context = second.exit();
    assert!(deletes_a_program(&second_context.calls()));
}

#[test]
fn pipeline_requires_matching_uniform_buffer_count() {
    let device = device();
    let program = device
        .create_program(&program_desc(&["ub_Scene"], &[]))
        .unwrap();
    let layout = device.create_input_layout(&gft::InputLayoutDescriptor {
        attributes: &[],
        index_buffer_format: None,
    });
    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        binding_layout: gft::BindingLayoutDescriptor {
            num_uniform_buffers: 1,
            num_samplers: 0,
        },
        program: &program,
        topology: gft::PrimitiveTopology::Triangles,
        render_flags: gft::RenderFlags::default(),
        input_layout: &layout,
    });
    assert!(pipeline.input_layout().is_same(&layout));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        device.create_render_pipeline(&RenderPipelineDescriptor {
            binding_layout: gft::BindingLayoutDescriptor {
                num_uniform_buffers: 2,
                num_samplers: 0,
            },
            program: &program,
            topology: gft::PrimitiveTopology::Triangles,
            render_flags: gft::RenderFlags::default(),
            input_layout: &layout,
        })
    }));
    assert!(result.is_err());
}

#[test]
fn input_state_wires_attributes_and_index_buffer() {
    let device = device();
    let vertices = device
        .create_buffer(&buffer_desc(64, BufferUsage::Vertex))
        .unwrap();
    let indices = device
        .create_buffer(&buffer_desc(8, BufferUsage::Index))
        .unwrap();
    let calls = device.context().calls();
    let (vertex_raw, index_raw) = match created(&calls)[..] {
        [Object::Buffer(v), Object::Buffer(i)] => (v, i),
        ref other => panic!("unexpected objects {:?}", other),
    };

    let attributes = [
        gft::VertexAttributeDescriptor {
            location: 0,
            format: Format::F32_RGB,
            buffer_index: 0,
            buffer_byte_offset: 0,
        },
        gft::VertexAttributeDescriptor {
            location: 1,
            format: Format::U8_RGBA_NORM,
            buffer_index: 0,
            buffer_byte_offset: 12,
        },
    ];
    let layout = device.create_input_layout(&gft::InputLayoutDescriptor {
        attributes: &attributes,
        index_buffer_format: Some(Format::U16_R),
    });
    assert_eq!(layout.index().map(|index| index.byte_size), Some(2));

    reset(&device);
    let input_state = device
        .create_input_state(
            &layout,
            &[VertexBufferDescriptor {
                buffer: &vertices,
                byte_offset: 4,
                byte_stride: 16,
            }],
            Some(&indices),
        )
        .unwrap();
    assert!(input_state.has_index_buffer());

    let commands = take_commands(&device);
    assert!(commands.contains(&Command::VertexAttribPointer {
        location: 1,
        size: 4,
        data_type: glow::UNSIGNED_BYTE,
        normalized: true,
        stride: 16,
        offset: 16,
    }));
    assert!(commands.contains(&Command::BindBuffer {
        target: glow::ARRAY_BUFFER,
        buffer: Some(vertex_raw),
    }));
    assert!(commands.contains(&Command::BindBuffer {
        target: glow::ELEMENT_ARRAY_BUFFER,
        buffer: Some(index_raw),
    }));
    // the vertex array is unbound before anything else can touch it
    let unbind = commands
        .iter()
        .position(|c| *c == Command::BindVertexArray(None));
    let index_bind = commands.iter().position(|c| {
        *c == Command::BindBuffer {
            target: glow::ELEMENT_ARRAY_BUFFER,
            buffer: Some(index_raw),
        }
    });
    assert!(index_bind < unbind);
}

#[test]
#[should_panic(expected = "Uniform buffer used where a Vertex buffer is required")]
fn input_state_rejects_wrong_buffer_usage() {
    let device = device();
    let uniforms = device
        .create_buffer(&buffer_desc(16, BufferUsage::Uniform))
        .unwrap();
    let layout = device.create_input_layout(&gft::InputLayoutDescriptor {
        attributes: &[gft::VertexAttributeDescriptor {
            location: 0,
            format: Format::F32_RG,
            buffer_index: 0,
            buffer_byte_offset: 0,
        }],
        index_buffer_format: None,
    });
    let _ = device.create_input_state(
        &layout,
        &[VertexBufferDescriptor {
            buffer: &uniforms,
            byte_offset: 0,
            byte_stride: 8,
        }],
        None,
    );
}

fn indexed_layout(device: &Device<common::Api>) -> gfx_platform::InputLayout {
    device.create_input_layout(&gft::InputLayoutDescriptor {
        attributes: &[gft::VertexAttributeDescriptor {
            location: 0,
            format: Format::F32_RG,
            buffer_index: 0,
            buffer_byte_offset: 0,
        }],
        index_buffer_format: Some(Format::U16_R),
    })
}

#[test]
#[should_panic(expected = "Vertex buffer used where a Index buffer is required")]
fn input_state_rejects_a_vertex_buffer_as_index_buffer() {
    let device = device();
    let vertices = device
        .create_buffer(&buffer_desc(16, BufferUsage::Vertex))
        .unwrap();
    let layout = indexed_layout(&device);
    let _ = device.create_input_state(
        &layout,
        &[VertexBufferDescriptor {
            buffer: &vertices,
            byte_offset: 0,
            byte_stride: 8,
        }],
        Some(&vertices),
    );
}

#[test]
fn indexed_layout_accepts_an_input_state_without_index_buffer() {
    let device = device();
    let vertices = device
        .create_buffer(&buffer_desc(16, BufferUsage::Vertex))
        .unwrap();
    let layout = indexed_layout(&device);
    reset(&device);

    let input_state = device
        .create_input_state(
            &layout,
            &[VertexBufferDescriptor {
                buffer: &vertices,
                byte_offset: 0,
                byte_stride: 8,
            }],
            None,
        )
        .unwrap();
    assert!(!input_state.has_index_buffer());
    assert!(input_state.input_layout().is_same(&layout));
    assert!(!take_commands(&device).iter().any(|c| match c {
        Command::BindBuffer {
            target: glow::ELEMENT_ARRAY_BUFFER,
            ..
        } => true,
        _ => false,
    }));
}

#[test]
#[should_panic(expected = "Index buffer given for an input layout without an index format")]
fn index_buffer_requires_an_index_format() {
    let device = device();
    let vertices = device
        .create_buffer(&buffer_desc(16, BufferUsage::Vertex))
        .unwrap();
    let indices = device
        .create_buffer(&buffer_desc(4, BufferUsage::Index))
        .unwrap();
    let layout = device.create_input_layout(&gft::InputLayoutDescriptor {
        attributes: &[],
        index_buffer_format: None,
    });
    let _ = device.create_input_state(
        &layout,
        &[VertexBufferDescriptor {
            buffer: &vertices,
            byte_offset: 0,
            byte_stride: 8,
        }],
        Some(&indices),
    );
}

#[test]
#[should_panic(expected = "Unsupported index buffer format")]
fn input_layout_rejects_u32_indices() {
    let device = device();
    device.create_input_layout(&gft::InputLayoutDescriptor {
        attributes: &[],
        index_buffer_format: Some(Format::U32_R),
    });
}

#[test]
fn buffer_uploads_can_be_read_back() {
    let device = device();
    let buffer = device
        .create_buffer(&buffer_desc(4, BufferUsage::Uniform))
        .unwrap();
    device.upload_buffer_data(&buffer, 1, &[1, 2, 3, 4, 5, 6, 7, 8]);

    let mut contents = [0xFFu8; 16];
    device.read_buffer_data(&buffer, 0, &mut contents);
    assert_eq!(contents, [0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 0, 0, 0, 0]);
}

#[test]
#[should_panic(expected = "out of bounds of a 16 byte buffer")]
fn buffer_uploads_are_bounds_checked() {
    let device = device();
    let buffer = device
        .create_buffer(&buffer_desc(4, BufferUsage::Vertex))
        .unwrap();
    device.upload_buffer_data(&buffer, 3, &[0; 8]);
}

#[test]
fn texture_upload_walks_the_mip_chain() {
    let device = device();
    let texture = device
        .create_texture(&gft::TextureDescriptor {
            format: Format::U8_R_NORM,
            width: 8,
            height: 2,
            mipmapped: true,
            sample_count: 1,
        })
        .unwrap();
    assert_eq!(texture.mip_level_count(), 2);

    reset(&device);
    let level0 = [0u8; 16];
    let level1 = [0u8; 4];
    device.upload_texture_data(
        &texture,
        &gft::TextureMipChain {
            mip_levels: &[&level0, &level1],
        },
    );
    let uploads: Vec<_> = device
        .context()
        .take_calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Command(
                Command::TexSubImage2d {
                    level,
                    width,
                    height,
                    format,
                    ..
                },
                len,
            ) => Some((level, width, height, format, len)),
            _ => None,
        })
        .collect();
    assert_eq!(
        uploads,
        vec![(0, 8, 2, glow::RED, 16), (1, 4, 1, glow::RED, 4)]
    );
}

#[test]
#[should_panic(expected = "Mip chain has 1 levels, but the texture has 2")]
fn texture_upload_requires_every_level() {
    let device = device();
    let texture = device
        .create_texture(&gft::TextureDescriptor {
            format: Format::U8_R_NORM,
            width: 2,
            height: 2,
            mipmapped: true,
            sample_count: 1,
        })
        .unwrap();
    device.upload_texture_data(
        &texture,
        &gft::TextureMipChain {
            mip_levels: &[&[0u8; 4]],
        },
    );
}

#[test]
fn limits_are_expressed_in_words() {
    let device = device();
    assert_eq!(device.query_limits().uniform_buffer_word_alignment, 64);
    device
        .context()
        .set_parameter(glow::UNIFORM_BUFFER_OFFSET_ALIGNMENT, 16);
    assert_eq!(device.query_limits().uniform_buffer_word_alignment, 4);
}

#[test]
fn destroy_dispatches_on_the_resource_kind() {
    let device = device();
    let buffer = device
        .create_buffer(&buffer_desc(4, BufferUsage::Vertex))
        .unwrap();
    let sampler = device.create_sampler(&Default::default()).unwrap();
    let layout = device.create_input_layout(&gft::InputLayoutDescriptor {
        attributes: &[],
        index_buffer_format: None,
    });
    let created_objects = created(&device.context().take_calls());

    let resources: Vec<Resource<common::Api>> =
        vec![buffer.into(), sampler.into(), layout.into()];
    let kinds: Vec<_> = resources.iter().map(Resource::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ResourceKind::Buffer,
            ResourceKind::Sampler,
            ResourceKind::InputLayout
        ]
    );
    assert!(resources[0].as_buffer().is_some());
    assert!(resources[0].as_sampler().is_none());

    for resource in resources {
        device.destroy(resource);
    }
    let deleted: Vec<_> = device
        .context()
        .take_calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Delete(object) => Some(object),
            _ => None,
        })
        .collect();
    assert_eq!(deleted, created_objects);
}
