use crate::{Api, ApplyFlagsOptions, Command, Device, DeviceError, Program, ProgramError, Texture};

const ONSCREEN_FORMAT: gft::Format = gft::Format::U8_RGBA_NORM;

fn fullscreen_copy_program() -> gft::ProgramDescriptor {
    gft::ProgramDescriptor {
        vertex: include_str!("shaders/fullscreen_copy.vert").to_string(),
        fragment: include_str!("shaders/fullscreen_copy.frag").to_string(),
        uniform_buffers: Vec::new(),
        samplers: vec!["u_Texture".to_string()],
    }
}

/// Owns a device and the texture that ends up on screen.
///
/// Frames are rendered (or resolved) into [`SwapChain::onscreen_texture`],
/// and [`SwapChain::present`] copies it to the default framebuffer.
pub struct SwapChain<A: Api> {
    device: Device<A>,
    copy_program: Program<A>,
    copy_flags: gft::RenderFlags,
    width: u32,
    height: u32,
    texture: Option<Texture<A>>,
}

impl<A: Api> SwapChain<A> {
    pub fn new(device: Device<A>) -> Result<Self, ProgramError> {
        let copy_program = device.create_program(&fullscreen_copy_program())?;
        Ok(Self {
            device,
            copy_program,
            copy_flags: gft::RenderFlags {
                depth_test: false,
                ..gft::RenderFlags::default()
            },
            width: 0,
            height: 0,
            texture: None,
        })
    }

    pub fn device(&self) -> &Device<A> {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device<A> {
        &mut self.device
    }

    /// Borrows the device mutably alongside the onscreen texture, so a pass
    /// can resolve into it.
    pub fn parts_mut(&mut self) -> (&mut Device<A>, Option<&Texture<A>>) {
        (&mut self.device, self.texture.as_ref())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resizes the onscreen texture. Nothing happens when the size is
    /// unchanged.
    pub fn configure(&mut self, width: u32, height: u32) -> Result<(), DeviceError> {
        if self.width == width && self.height == height {
            return Ok(());
        }
        log::debug!(
            "Configuring swap chain from {}x{} to {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        // a failed creation keeps the previous texture and size
        let texture = self.device.create_texture(&gft::TextureDescriptor {
            format: ONSCREEN_FORMAT,
            width,
            height,
            mipmapped: false,
            sample_count: 1,
        })?;
        if let Some(old) = self.texture.take() {
            self.device.destroy_texture(old);
        }
        self.width = width;
        self.height = height;
        self.device.configure_texture_sampling(
            &texture,
            &gft::SamplerDescriptor {
                wrap_s: gft::WrapMode::Clamp,
                wrap_t: gft::WrapMode::Clamp,
                min_filter: gft::TexFilterMode::Bilinear,
                mag_filter: gft::TexFilterMode::Bilinear,
                ..gft::SamplerDescriptor::default()
            },
        );
        self.texture = Some(texture);
        Ok(())
    }

    pub fn onscreen_texture(&self) -> Option<&Texture<A>> {
        self.texture.as_ref()
    }

    /// Copies the onscreen texture to the default framebuffer with a single
    /// full-screen triangle.
    pub fn present(&mut self) {
        let texture = match self.texture {
            Some(ref texture) => texture,
            None => panic!("Swap chain must be configured before presenting"),
        };
        let device = &mut self.device;
        assert_eq!(
            device.pass.phase,
            crate::PassPhase::Inactive,
            "Cannot present while a render pass is active"
        );

        device.execute(Command::BindFramebuffer {
            target: glow::DRAW_FRAMEBUFFER,
            framebuffer: None,
        });
        device.execute(Command::Viewport {
            x: 0,
            y: 0,
            width: self.width as i32,
            height: self.height as i32,
        });
        for command in device.render_flags.transition(
            &self.copy_flags,
            ApplyFlagsOptions {
                force_disable_culling: true,
            },
        ) {
            device.execute(command);
        }
        device.execute(Command::ActiveTexture(glow::TEXTURE0));
        device.execute(Command::BindSampler {
            unit: 0,
            sampler: None,
        });
        device.execute(Command::BindTexture {
            target: texture.target,
            texture: Some(texture.raw),
        });
        device.execute(Command::UseProgram(Some(self.copy_program.raw)));
        device.execute(Command::BindVertexArray(None));
        device.execute(Command::DrawArrays {
            mode: glow::TRIANGLES,
            first: 0,
            count: 3,
        });
    }

    /// Destroys the onscreen texture and exits the device.
    pub fn exit(mut self) -> A::Context {
        if let Some(texture) = self.texture.take() {
            self.device.destroy_texture(texture);
        }
        self.device.exit()
    }
}
