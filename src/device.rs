use std::sync::Arc;

use gft::{BufferUsage, LoadDisposition};

use crate::{
    conv,
    pass::PassState,
    resource::{Attachment, InputLayoutInner},
    Api, Buffer, ClearMask, ColorAttachment, Command, Context as _, DepthStencilAttachment,
    DeviceError, IndexDesc, InputLayout, InputState, Object, Program, ProgramCache, ProgramError,
    RenderFlagsTracker, RenderPipeline, RenderPipelineDescriptor, RenderTarget,
    RenderTargetDescriptor, Resource, Sampler, SharedProgramCache, Texture,
    VertexBufferDescriptor, MAX_SAMPLERS, TRANSFER_TEXTURE_UNIT,
};

type DeviceResult<T> = Result<T, DeviceError>;

/// Creates resources and runs passes on one native context.
///
/// Resources are plain handles: they must be destroyed on the device that
/// created them, and dropping one without destroying it leaks the native
/// object.
pub struct Device<A: Api> {
    context: A::Context,
    label: Option<String>,
    flags: gft::DeviceFlags,
    programs: SharedProgramCache<A>,
    pub(crate) render_flags: RenderFlagsTracker,
    pub(crate) pass: PassState<A>,
    /// Read and draw framebuffers used by resolves, created on first use.
    resolve_framebuffers: Option<(A::Framebuffer, A::Framebuffer)>,
}

impl<A: Api> Device<A> {
    pub fn new(context: A::Context, desc: &gft::DeviceDescriptor<gft::Label>) -> Self {
        Self::with_program_cache(context, desc, ProgramCache::new_shared())
    }

    /// Creates a device that shares compiled programs with other devices of
    /// the same context.
    pub fn with_program_cache(
        context: A::Context,
        desc: &gft::DeviceDescriptor<gft::Label>,
        programs: SharedProgramCache<A>,
    ) -> Self {
        log::info!("Device {:?} created with {:?}", desc.label, desc.flags);
        let device = Self {
            context,
            label: desc.label.map(str::to_string),
            flags: desc.flags,
            programs,
            render_flags: RenderFlagsTracker::new(),
            pass: PassState::default(),
            resolve_framebuffers: None,
        };
        // mip levels are uploaded tightly packed
        device.execute(Command::PixelStore {
            parameter: glow::UNPACK_ALIGNMENT,
            value: 1,
        });
        device
    }

    pub fn context(&self) -> &A::Context {
        &self.context
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn flags(&self) -> gft::DeviceFlags {
        self.flags
    }

    pub fn program_cache(&self) -> SharedProgramCache<A> {
        Arc::clone(&self.programs)
    }

    pub(crate) fn execute(&self, command: Command<A>) {
        self.execute_with_data(command, &[]);
    }

    pub(crate) fn execute_with_data(&self, command: Command<A>, data: &[u8]) {
        unsafe { self.context.process(&command, data) };
        if self.flags.contains(gft::DeviceFlags::VALIDATION) {
            let error = unsafe { self.context.get_error() };
            if error != glow::NO_ERROR {
                log::error!("GL error {:#x} raised by {:?}", error, command);
            }
        }
    }

    pub fn query_limits(&self) -> gft::DeviceLimits {
        let alignment = unsafe {
            self.context
                .get_parameter_i32(glow::UNIFORM_BUFFER_OFFSET_ALIGNMENT)
        };
        gft::DeviceLimits {
            uniform_buffer_word_alignment: (alignment.max(1) as u32 + gft::WORD_SIZE - 1)
                / gft::WORD_SIZE,
        }
    }

    pub fn create_buffer(&self, desc: &gft::BufferDescriptor) -> DeviceResult<Buffer<A>> {
        let target = conv::map_buffer_usage(desc.usage);
        let byte_size = desc.word_count as u64 * gft::WORD_SIZE as u64;
        if byte_size > i32::MAX as u64 {
            log::error!("Buffer of {} words is too large", desc.word_count);
            return Err(DeviceError::OutOfMemory);
        }

        let raw = unsafe { self.context.create_buffer() }?;
        self.execute(Command::BindBuffer {
            target,
            buffer: Some(raw),
        });
        self.execute(Command::BufferData {
            target,
            size: byte_size as i32,
            usage: conv::map_frequency_hint(desc.hint),
        });
        self.execute(Command::BindBuffer {
            target,
            buffer: None,
        });
        log::debug!(
            "Created {:?} buffer {:?} of {} words",
            desc.usage,
            raw,
            desc.word_count
        );

        Ok(Buffer {
            raw,
            target,
            usage: desc.usage,
            word_count: desc.word_count,
        })
    }

    pub fn destroy_buffer(&self, buffer: Buffer<A>) {
        unsafe { self.context.delete(Object::Buffer(buffer.raw)) };
    }

    pub fn create_texture(&self, desc: &gft::TextureDescriptor) -> DeviceResult<Texture<A>> {
        assert_eq!(
            desc.sample_count, 1,
            "Multisampled textures are not supported, render to a color attachment and resolve instead"
        );
        assert!(
            desc.width > 0 && desc.height > 0,
            "Texture extent {}x{} is empty",
            desc.width,
            desc.height
        );
        let format_desc = conv::describe_texture_format(desc.format);
        let mip_level_count = if desc.mipmapped {
            gft::math::mip_level_count(desc.width, desc.height)
        } else {
            1
        };
        let target = glow::TEXTURE_2D;

        let raw = unsafe { self.context.create_texture() }?;
        self.bind_transfer_texture(target, Some(raw));
        self.execute(Command::TexParameterI {
            target,
            parameter: glow::TEXTURE_MAX_LEVEL,
            value: mip_level_count as i32 - 1,
        });
        self.execute(Command::TexStorage2d {
            target,
            levels: mip_level_count as i32,
            internal_format: format_desc.internal,
            width: desc.width as i32,
            height: desc.height as i32,
        });
        log::debug!(
            "Created {}x{} texture {:?} of {:?} with {} levels",
            desc.width,
            desc.height,
            raw,
            desc.format,
            mip_level_count
        );

        Ok(Texture {
            raw,
            target,
            format: desc.format,
            format_desc,
            width: desc.width,
            height: desc.height,
            mip_level_count,
        })
    }

    pub fn destroy_texture(&self, texture: Texture<A>) {
        unsafe { self.context.delete(Object::Texture(texture.raw)) };
    }

    /// Binds `texture` on the unit reserved for transfers, leaving the units
    /// of binding layouts alone.
    fn bind_transfer_texture(&self, target: u32, texture: Option<A::Texture>) {
        self.execute(Command::ActiveTexture(glow::TEXTURE0 + TRANSFER_TEXTURE_UNIT));
        self.execute(Command::BindTexture { target, texture });
    }

    /// Sets the sampling parameters of the texture object itself, for use
    /// without a sampler object bound.
    pub(crate) fn configure_texture_sampling(
        &self,
        texture: &Texture<A>,
        desc: &gft::SamplerDescriptor,
    ) {
        self.bind_transfer_texture(texture.target, Some(texture.raw));
        self.configure_sampling(&TextureParams(texture.target), desc);
    }

    fn configure_sampling(&self, object: &impl Sampled<A>, desc: &gft::SamplerDescriptor) {
        let min = conv::map_filter_mode(desc.min_filter, desc.mip_filter);
        let mag = conv::map_filter_mode(desc.mag_filter, gft::MipFilterMode::NoMip);

        self.execute(object.param_int(glow::TEXTURE_WRAP_S, conv::map_wrap_mode(desc.wrap_s) as i32));
        self.execute(object.param_int(glow::TEXTURE_WRAP_T, conv::map_wrap_mode(desc.wrap_t) as i32));
        self.execute(object.param_int(glow::TEXTURE_MIN_FILTER, min as i32));
        self.execute(object.param_int(glow::TEXTURE_MAG_FILTER, mag as i32));
        self.execute(object.param_float(glow::TEXTURE_MIN_LOD, desc.min_lod));
        self.execute(object.param_float(glow::TEXTURE_MAX_LOD, desc.max_lod));
    }

    pub fn create_sampler(&self, desc: &gft::SamplerDescriptor) -> DeviceResult<Sampler<A>> {
        let raw = unsafe { self.context.create_sampler() }?;
        self.configure_sampling(&SamplerParams::<A>(raw), desc);
        log::debug!("Created sampler {:?}", raw);
        Ok(Sampler { raw })
    }

    pub fn destroy_sampler(&self, sampler: Sampler<A>) {
        unsafe { self.context.delete(Object::Sampler(sampler.raw)) };
    }

    fn create_attachment(
        &self,
        internal_format: u32,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> DeviceResult<Attachment<A>> {
        assert!(sample_count >= 1, "Sample count must be at least 1");
        let raw = unsafe { self.context.create_renderbuffer() }?;
        self.execute(Command::BindRenderbuffer(Some(raw)));
        self.execute(Command::RenderbufferStorageMultisample {
            samples: sample_count as i32,
            internal_format,
            width: width as i32,
            height: height as i32,
        });
        self.execute(Command::BindRenderbuffer(None));
        log::debug!(
            "Created {}x{} renderbuffer {:?} with {} samples",
            width,
            height,
            raw,
            sample_count
        );
        Ok(Attachment {
            raw,
            width,
            height,
            sample_count,
        })
    }

    pub fn create_color_attachment(
        &self,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> DeviceResult<ColorAttachment<A>> {
        let inner = self.create_attachment(glow::RGBA8, width, height, sample_count)?;
        Ok(ColorAttachment { inner })
    }

    pub fn destroy_color_attachment(&self, attachment: ColorAttachment<A>) {
        unsafe { self.context.delete(Object::Renderbuffer(attachment.inner.raw)) };
    }

    pub fn create_depth_stencil_attachment(
        &self,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> DeviceResult<DepthStencilAttachment<A>> {
        let inner = self.create_attachment(glow::DEPTH24_STENCIL8, width, height, sample_count)?;
        Ok(DepthStencilAttachment { inner })
    }

    pub fn destroy_depth_stencil_attachment(&self, attachment: DepthStencilAttachment<A>) {
        unsafe { self.context.delete(Object::Renderbuffer(attachment.inner.raw)) };
    }

    pub fn create_render_target(
        &self,
        desc: &RenderTargetDescriptor<A>,
    ) -> DeviceResult<RenderTarget<A>> {
        let color = desc.color_attachment.inner;
        let depth = desc.depth_stencil_attachment.inner;
        assert!(
            color.width == depth.width && color.height == depth.height,
            "Color attachment is {}x{} but the depth/stencil attachment is {}x{}",
            color.width,
            color.height,
            depth.width,
            depth.height
        );
        assert_eq!(
            color.sample_count, depth.sample_count,
            "Color and depth/stencil attachments have different sample counts"
        );

        let framebuffer = unsafe { self.context.create_framebuffer() }?;
        let target = glow::DRAW_FRAMEBUFFER;
        self.execute(Command::BindFramebuffer {
            target,
            framebuffer: Some(framebuffer),
        });
        self.execute(Command::FramebufferRenderbuffer {
            target,
            attachment: glow::COLOR_ATTACHMENT0,
            renderbuffer: Some(color.raw),
        });
        self.execute(Command::FramebufferRenderbuffer {
            target,
            attachment: glow::DEPTH_STENCIL_ATTACHMENT,
            renderbuffer: Some(depth.raw),
        });
        self.execute(Command::BindFramebuffer {
            target,
            framebuffer: None,
        });

        let mut clear_mask = ClearMask::empty();
        clear_mask.set(
            ClearMask::COLOR,
            desc.color_load_disposition == LoadDisposition::Clear,
        );
        clear_mask.set(
            ClearMask::DEPTH,
            desc.depth_load_disposition == LoadDisposition::Clear,
        );
        clear_mask.set(
            ClearMask::STENCIL,
            desc.stencil_load_disposition == LoadDisposition::Clear,
        );
        log::debug!(
            "Created render target {:?} clearing {:?}",
            framebuffer,
            clear_mask
        );

        Ok(RenderTarget {
            framebuffer,
            color,
            clear_mask,
            clear_color: desc.color_clear_color,
            depth_clear_value: desc.depth_clear_value,
            stencil_clear_value: desc.stencil_clear_value,
        })
    }

    /// Deletes the framebuffer. The attachments stay alive.
    pub fn destroy_render_target(&self, target: RenderTarget<A>) {
        unsafe { self.context.delete(Object::Framebuffer(target.framebuffer)) };
    }

    /// Returns the cached program for `desc`, compiling and linking it on
    /// first use.
    pub fn create_program(&self, desc: &gft::ProgramDescriptor) -> Result<Program<A>, ProgramError> {
        self.programs.lock().get_or_create(&self.context, desc)
    }

    /// Programs belong to the program cache and are deleted when the last
    /// device sharing it exits.
    pub fn destroy_program(&self, _program: Program<A>) {}

    pub fn query_program<'a>(&self, program: &'a Program<A>) -> &'a gft::ProgramReflection {
        program.reflection()
    }

    pub fn create_input_layout(&self, desc: &gft::InputLayoutDescriptor) -> InputLayout {
        let index = desc.index_buffer_format.map(|format| IndexDesc {
            index_type: conv::map_index_format(format),
            byte_size: format.byte_size(),
        });
        InputLayout {
            inner: Arc::new(InputLayoutInner {
                attributes: desc.attributes.to_vec(),
                index,
            }),
        }
    }

    /// Input layouts hold no native object; the memory goes away with the
    /// last clone.
    pub fn destroy_input_layout(&self, _layout: InputLayout) {}

    pub fn create_input_state(
        &self,
        layout: &InputLayout,
        vertex_buffers: &[VertexBufferDescriptor<A>],
        index_buffer: Option<&Buffer<A>>,
    ) -> DeviceResult<InputState<A>> {
        // the index buffer stays optional, only indexed draws need one
        let index = match (layout.index(), index_buffer) {
            (None, Some(_)) => {
                panic!("Index buffer given for an input layout without an index format")
            }
            (index, Some(_)) => index,
            (_, None) => None,
        };

        let raw = unsafe { self.context.create_vertex_array() }?;
        self.execute(Command::BindVertexArray(Some(raw)));

        for attribute in layout.attributes() {
            let vertex_buffer = match vertex_buffers.get(attribute.buffer_index as usize) {
                Some(vb) => vb,
                None => panic!(
                    "Attribute at location {} reads vertex buffer {}, but only {} were given",
                    attribute.location,
                    attribute.buffer_index,
                    vertex_buffers.len()
                ),
            };
            vertex_buffer.buffer.check_usage(BufferUsage::Vertex);
            let format_desc = conv::map_vertex_format(attribute.format);

            self.execute(Command::BindBuffer {
                target: glow::ARRAY_BUFFER,
                buffer: Some(vertex_buffer.buffer.raw),
            });
            self.execute(Command::VertexAttribPointer {
                location: attribute.location,
                size: format_desc.size,
                data_type: format_desc.data_type,
                normalized: format_desc.normalized,
                stride: vertex_buffer.byte_stride as i32,
                offset: (vertex_buffer.byte_offset + attribute.buffer_byte_offset) as i32,
            });
            self.execute(Command::EnableVertexAttribArray(attribute.location));
        }

        if let Some(buffer) = index_buffer {
            buffer.check_usage(BufferUsage::Index);
            self.execute(Command::BindBuffer {
                target: glow::ELEMENT_ARRAY_BUFFER,
                buffer: Some(buffer.raw),
            });
        }

        self.execute(Command::BindVertexArray(None));
        self.execute(Command::BindBuffer {
            target: glow::ARRAY_BUFFER,
            buffer: None,
        });
        log::debug!(
            "Created input state {:?} with {} attributes",
            raw,
            layout.attributes().len()
        );

        Ok(InputState {
            raw,
            layout: layout.clone(),
            index,
        })
    }

    pub fn destroy_input_state(&self, input_state: InputState<A>) {
        unsafe { self.context.delete(Object::VertexArray(input_state.raw)) };
    }

    pub fn create_render_pipeline(&self, desc: &RenderPipelineDescriptor<A>) -> RenderPipeline<A> {
        let reflected = desc.program.reflection.uniform_buffers.len();
        assert_eq!(
            desc.binding_layout.num_uniform_buffers as usize, reflected,
            "Binding layout declares {} uniform buffers, but the program has {}",
            desc.binding_layout.num_uniform_buffers, reflected
        );
        assert!(
            desc.binding_layout.num_samplers <= MAX_SAMPLERS,
            "Binding layout declares {} samplers, the limit is {}",
            desc.binding_layout.num_samplers,
            MAX_SAMPLERS
        );

        RenderPipeline {
            binding_layout: desc.binding_layout,
            program: desc.program.clone(),
            draw_mode: conv::map_primitive_topology(desc.topology),
            render_flags: desc.render_flags,
            input_layout: desc.input_layout.clone(),
        }
    }

    /// Pipelines hold no native object.
    pub fn destroy_render_pipeline(&self, _pipeline: RenderPipeline<A>) {}

    /// Destroys a resource of any kind.
    pub fn destroy(&self, resource: Resource<A>) {
        match resource {
            Resource::Buffer(buffer) => self.destroy_buffer(buffer),
            Resource::Texture(texture) => self.destroy_texture(texture),
            Resource::Sampler(sampler) => self.destroy_sampler(sampler),
            Resource::ColorAttachment(attachment) => self.destroy_color_attachment(attachment),
            Resource::DepthStencilAttachment(attachment) => {
                self.destroy_depth_stencil_attachment(attachment)
            }
            Resource::RenderTarget(target) => self.destroy_render_target(target),
            Resource::Program(program) => self.destroy_program(program),
            Resource::InputLayout(layout) => self.destroy_input_layout(layout),
            Resource::InputState(input_state) => self.destroy_input_state(input_state),
            Resource::RenderPipeline(pipeline) => self.destroy_render_pipeline(pipeline),
        }
    }

    pub fn upload_buffer_data(&self, buffer: &Buffer<A>, dst_word_offset: u32, data: &[u8]) {
        buffer.check_range(dst_word_offset, data.len());
        if data.is_empty() {
            return;
        }
        self.execute(Command::BindBuffer {
            target: buffer.target,
            buffer: Some(buffer.raw),
        });
        self.execute_with_data(
            Command::BufferSubData {
                target: buffer.target,
                offset: (dst_word_offset * gft::WORD_SIZE) as i32,
            },
            data,
        );
    }

    /// Fills every level of `texture`, level 0 first.
    pub fn upload_texture_data(&self, texture: &Texture<A>, mip_chain: &gft::TextureMipChain) {
        assert_eq!(
            mip_chain.mip_levels.len(),
            texture.mip_level_count as usize,
            "Mip chain has {} levels, but the texture has {}",
            mip_chain.mip_levels.len(),
            texture.mip_level_count
        );
        let texel_size = texture.format.byte_size() as usize;

        self.bind_transfer_texture(texture.target, Some(texture.raw));
        let (mut width, mut height) = (texture.width, texture.height);
        for (level, data) in mip_chain.mip_levels.iter().enumerate() {
            let expected = width as usize * height as usize * texel_size;
            assert!(
                data.len() >= expected,
                "Mip level {} needs {} bytes for {}x{} texels, but {} were given",
                level,
                expected,
                width,
                height,
                data.len()
            );
            self.execute_with_data(
                Command::TexSubImage2d {
                    target: texture.target,
                    level: level as i32,
                    width: width as i32,
                    height: height as i32,
                    format: texture.format_desc.external,
                    ty: texture.format_desc.data_type,
                },
                &data[..expected],
            );
            let next = gft::math::next_mip_extent(width, height);
            width = next.0;
            height = next.1;
        }
    }

    /// Copies buffer contents back to the host. Slow, meant for debugging.
    pub fn read_buffer_data(&self, buffer: &Buffer<A>, src_word_offset: u32, dst: &mut [u8]) {
        buffer.check_range(src_word_offset, dst.len());
        self.execute(Command::BindBuffer {
            target: buffer.target,
            buffer: Some(buffer.raw),
        });
        unsafe {
            self.context.get_buffer_sub_data(
                buffer.target,
                (src_word_offset * gft::WORD_SIZE) as i32,
                dst,
            )
        };
    }

    pub(crate) fn resolve_framebuffers(
        &mut self,
    ) -> DeviceResult<(A::Framebuffer, A::Framebuffer)> {
        if let Some(framebuffers) = self.resolve_framebuffers {
            return Ok(framebuffers);
        }
        let read = unsafe { self.context.create_framebuffer() }?;
        let draw = match unsafe { self.context.create_framebuffer() } {
            Ok(draw) => draw,
            Err(e) => {
                unsafe { self.context.delete(Object::Framebuffer(read)) };
                return Err(e);
            }
        };
        log::debug!("Created resolve framebuffers {:?} and {:?}", read, draw);
        self.resolve_framebuffers = Some((read, draw));
        Ok((read, draw))
    }

    /// Releases the objects owned by the device itself and hands the native
    /// context back. Cached programs are deleted too, unless another device
    /// still shares the cache.
    pub fn exit(self) -> A::Context {
        let Self {
            context,
            label,
            programs,
            resolve_framebuffers,
            ..
        } = self;
        if let Some((read, draw)) = resolve_framebuffers {
            unsafe {
                context.delete(Object::Framebuffer(read));
                context.delete(Object::Framebuffer(draw));
            }
        }
        match Arc::try_unwrap(programs) {
            Ok(cache) => cache.into_inner().destroy(&context),
            Err(_) => log::debug!("Program cache is still shared, keeping its programs"),
        }
        log::info!("Device {:?} exited", label);
        context
    }
}

/// An object with sampling parameters: a sampler, or the texture bound to a
/// target on the active unit.
trait Sampled<A: Api> {
    fn param_int(&self, key: u32, value: i32) -> Command<A>;
    fn param_float(&self, key: u32, value: f32) -> Command<A>;
}

struct SamplerParams<A: Api>(A::Sampler);

impl<A: Api> Sampled<A> for SamplerParams<A> {
    fn param_int(&self, key: u32, value: i32) -> Command<A> {
        Command::SamplerParameterI {
            sampler: self.0,
            parameter: key,
            value,
        }
    }
    fn param_float(&self, key: u32, value: f32) -> Command<A> {
        Command::SamplerParameterF {
            sampler: self.0,
            parameter: key,
            value,
        }
    }
}

struct TextureParams(u32);

impl<A: Api> Sampled<A> for TextureParams {
    fn param_int(&self, key: u32, value: i32) -> Command<A> {
        Command::TexParameterI {
            target: self.0,
            parameter: key,
            value,
        }
    }
    fn param_float(&self, key: u32, value: f32) -> Command<A> {
        Command::TexParameterF {
            target: self.0,
            parameter: key,
            value,
        }
    }
}
