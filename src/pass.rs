use gft::BufferUsage;

use crate::{
    resource::Attachment, Api, ApplyFlagsOptions, BufferBinding, ClearMask, Command, Device,
    DeviceError, IndexDesc, InputLayout, InputState, RenderPipeline, RenderTarget, SamplerBinding,
    Texture,
};

/// Where a device is in the lifecycle of a render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassPhase {
    /// No pass is active.
    Inactive,
    /// A render target is bound.
    Bound,
    /// A pipeline is set, but no input state matches it.
    Configured,
    /// Pipeline and input state agree: draws are allowed.
    Ready,
}

pub(crate) struct PassState<A: Api> {
    pub(crate) phase: PassPhase,
    color: Option<Attachment<A>>,
    pipeline: Option<RenderPipeline<A>>,
    input: Option<(InputLayout, Option<IndexDesc>)>,
}

impl<A: Api> Default for PassState<A> {
    fn default() -> Self {
        Self {
            phase: PassPhase::Inactive,
            color: None,
            pipeline: None,
            input: None,
        }
    }
}

impl<A: Api> Device<A> {
    pub fn pass_phase(&self) -> PassPhase {
        self.pass.phase
    }

    /// Binds `target` for drawing and clears the attachments whose load
    /// disposition is `Clear`.
    pub fn begin_pass(&mut self, target: &RenderTarget<A>) -> PassRenderer<'_, A> {
        assert_eq!(
            self.pass.phase,
            PassPhase::Inactive,
            "A render pass is already active"
        );
        log::trace!("Begin pass on {:?}", target.framebuffer);

        self.execute(Command::BindFramebuffer {
            target: glow::DRAW_FRAMEBUFFER,
            framebuffer: Some(target.framebuffer),
        });
        self.execute(Command::Viewport {
            x: 0,
            y: 0,
            width: target.color.width as i32,
            height: target.color.height as i32,
        });

        let mask = target.clear_mask;
        if mask.contains(ClearMask::DEPTH) && !self.render_flags.current().depth_write {
            let flags = gft::RenderFlags {
                depth_write: true,
                ..*self.render_flags.current()
            };
            for command in self
                .render_flags
                .transition(&flags, ApplyFlagsOptions::default())
            {
                self.execute(command);
            }
        }
        if mask.contains(ClearMask::COLOR) {
            self.execute(Command::ClearColor(target.clear_color.to_array()));
        }
        if mask.contains(ClearMask::DEPTH) {
            self.execute(Command::ClearDepth(target.depth_clear_value));
        }
        if mask.contains(ClearMask::STENCIL) {
            self.execute(Command::ClearStencil(target.stencil_clear_value as i32));
        }
        if !mask.is_empty() {
            self.execute(Command::Clear(mask.bits()));
        }

        self.pass = PassState {
            phase: PassPhase::Bound,
            color: Some(target.color),
            pipeline: None,
            input: None,
        };
        PassRenderer { device: self }
    }
}

/// Records draws into the render target of an active pass.
///
/// The pass borrows the device, so no resources can be created or uploaded
/// until [`PassRenderer::end_pass`] is called.
pub struct PassRenderer<'a, A: Api> {
    device: &'a mut Device<A>,
}

impl<'a, A: Api> PassRenderer<'a, A> {
    pub fn phase(&self) -> PassPhase {
        self.device.pass.phase
    }

    fn set_phase(&mut self, phase: PassPhase) {
        log::trace!("Pass {:?} -> {:?}", self.device.pass.phase, phase);
        self.device.pass.phase = phase;
    }

    fn pipeline(&self, operation: &str) -> &RenderPipeline<A> {
        match self.device.pass.pipeline {
            Some(ref pipeline) => pipeline,
            None => panic!("{} requires a pipeline, call set_pipeline first", operation),
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.device.execute(Command::Viewport {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        });
    }

    /// Applies the pipeline's render flags and program. A bound input state
    /// stays bound when it was built for the same input layout.
    pub fn set_pipeline(&mut self, pipeline: &RenderPipeline<A>) {
        let device = &mut *self.device;
        for command in device
            .render_flags
            .transition(&pipeline.render_flags, ApplyFlagsOptions::default())
        {
            device.execute(command);
        }
        device.execute(Command::UseProgram(Some(pipeline.program.raw)));

        let keep_input = match device.pass.input {
            Some((ref layout, _)) => layout.is_same(&pipeline.input_layout),
            None => false,
        };
        if !keep_input {
            device.pass.input = None;
        }
        device.pass.pipeline = Some(pipeline.clone());
        self.set_phase(if keep_input {
            PassPhase::Ready
        } else {
            PassPhase::Configured
        });
    }

    pub fn set_input_state(&mut self, input_state: &InputState<A>) {
        assert!(
            self.pipeline("set_input_state")
                .input_layout
                .is_same(&input_state.layout),
            "Input state was built for a different input layout than the current pipeline's"
        );
        self.device
            .execute(Command::BindVertexArray(Some(input_state.raw)));
        self.device.pass.input = Some((input_state.layout.clone(), input_state.index));
        self.set_phase(PassPhase::Ready);
    }

    /// Binds uniform buffers to the slots after the first
    /// `unchanged_uniform_buffers`, and textures with their samplers to the
    /// texture units after the first `unchanged_samplers`. The skipped slots
    /// keep what an earlier call bound.
    pub fn set_bindings(
        &mut self,
        unchanged_uniform_buffers: u32,
        uniform_buffers: &[BufferBinding<A>],
        unchanged_samplers: u32,
        samplers: &[SamplerBinding<A>],
    ) {
        let layout = *self.pipeline("set_bindings").binding_layout();
        assert_eq!(
            unchanged_uniform_buffers as usize + uniform_buffers.len(),
            layout.num_uniform_buffers as usize,
            "{} unchanged and {} new uniform buffers do not match the {} declared by the pipeline",
            unchanged_uniform_buffers,
            uniform_buffers.len(),
            layout.num_uniform_buffers
        );
        assert_eq!(
            unchanged_samplers as usize + samplers.len(),
            layout.num_samplers as usize,
            "{} unchanged and {} new samplers do not match the {} declared by the pipeline",
            unchanged_samplers,
            samplers.len(),
            layout.num_samplers
        );

        for (i, binding) in uniform_buffers.iter().enumerate() {
            binding.buffer.check_usage(BufferUsage::Uniform);
            let byte_count = binding.word_count as usize * gft::WORD_SIZE as usize;
            binding.buffer.check_range(binding.word_offset, byte_count);
            self.device.execute(Command::BindBufferRange {
                target: glow::UNIFORM_BUFFER,
                index: unchanged_uniform_buffers + i as u32,
                buffer: binding.buffer.raw,
                offset: (binding.word_offset * gft::WORD_SIZE) as i32,
                size: byte_count as i32,
            });
        }

        for (i, binding) in samplers.iter().enumerate() {
            let unit = unchanged_samplers + i as u32;
            self.device
                .execute(Command::ActiveTexture(glow::TEXTURE0 + unit));
            self.device.execute(Command::BindSampler {
                unit,
                sampler: Some(binding.sampler.raw),
            });
            self.device.execute(Command::BindTexture {
                target: binding.texture.target,
                texture: Some(binding.texture.raw),
            });
        }
    }

    fn check_ready(&self, operation: &str) {
        assert_eq!(
            self.device.pass.phase,
            PassPhase::Ready,
            "{} requires both a pipeline and a matching input state",
            operation
        );
    }

    pub fn draw(&mut self, vertex_count: u32, first_vertex: u32) {
        self.check_ready("draw");
        let mode = self.pipeline("draw").draw_mode;
        self.device.execute(Command::DrawArrays {
            mode,
            first: gl_int(first_vertex as u64, "First vertex"),
            count: gl_int(vertex_count as u64, "Vertex count"),
        });
    }

    pub fn draw_indexed(&mut self, index_count: u32, first_index: u32) {
        self.check_ready("draw_indexed");
        let index = match self.device.pass.input {
            Some((_, Some(index))) => index,
            _ => panic!("draw_indexed requires an input state with an index buffer"),
        };
        let mode = self.pipeline("draw_indexed").draw_mode;
        self.device.execute(Command::DrawElements {
            mode,
            count: gl_int(index_count as u64, "Index count"),
            index_type: index.index_type,
            offset: gl_int(
                first_index as u64 * index.byte_size as u64,
                "Index buffer byte offset",
            ),
        });
    }

    /// Ends the pass, optionally resolving the color attachment into
    /// `resolve_to`, which must have the attachment's extent.
    ///
    /// Dropping the renderer ends the pass too, without a resolve.
    pub fn end_pass(self, resolve_to: Option<&Texture<A>>) -> Result<(), DeviceError> {
        match (resolve_to, self.device.pass.color) {
            (Some(texture), Some(color)) => resolve(self.device, &color, texture),
            _ => Ok(()),
        }
    }
}

impl<'a, A: Api> Drop for PassRenderer<'a, A> {
    fn drop(&mut self) {
        self.device.execute(Command::BindVertexArray(None));
        log::trace!("End pass");
        self.device.pass = PassState::default();
    }
}

/// Converts a count or offset to the signed int GL expects.
fn gl_int(value: u64, what: &str) -> i32 {
    if value > i32::MAX as u64 {
        panic!("{} {} does not fit in a GL int", what, value);
    }
    value as i32
}

fn resolve<A: Api>(
    device: &mut Device<A>,
    color: &Attachment<A>,
    texture: &Texture<A>,
) -> Result<(), DeviceError> {
    assert!(
        texture.width == color.width && texture.height == color.height,
        "Resolve destination is {}x{}, but the color attachment is {}x{}",
        texture.width,
        texture.height,
        color.width,
        color.height
    );
    let (read, draw) = device.resolve_framebuffers()?;
    let rect = [0, 0, color.width as i32, color.height as i32];

    device.execute(Command::BindFramebuffer {
        target: glow::READ_FRAMEBUFFER,
        framebuffer: Some(read),
    });
    device.execute(Command::FramebufferRenderbuffer {
        target: glow::READ_FRAMEBUFFER,
        attachment: glow::COLOR_ATTACHMENT0,
        renderbuffer: Some(color.raw),
    });
    device.execute(Command::BindFramebuffer {
        target: glow::DRAW_FRAMEBUFFER,
        framebuffer: Some(draw),
    });
    device.execute(Command::FramebufferTexture2d {
        target: glow::DRAW_FRAMEBUFFER,
        attachment: glow::COLOR_ATTACHMENT0,
        texture: Some(texture.raw),
        level: 0,
    });
    device.execute(Command::BlitFramebuffer {
        src: rect,
        dst: rect,
        mask: glow::COLOR_BUFFER_BIT,
        filter: glow::NEAREST,
    });
    device.execute(Command::BindFramebuffer {
        target: glow::READ_FRAMEBUFFER,
        framebuffer: None,
    });
    device.execute(Command::BindFramebuffer {
        target: glow::DRAW_FRAMEBUFFER,
        framebuffer: None,
    });
    Ok(())
}
