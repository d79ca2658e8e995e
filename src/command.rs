use crate::Api;

/// One native GL call.
///
/// The device translates every operation into a sequence of commands and
/// hands each one to [`Context::process`](crate::Context::process) right
/// away. Commands that upload memory take their payload as a separate slice,
/// so they stay cheap to clone and compare.
#[derive(Clone, Debug, PartialEq)]
pub enum Command<A: Api> {
    BindBuffer {
        target: u32,
        buffer: Option<A::Buffer>,
    },
    /// Allocates storage for the buffer bound to `target`.
    BufferData {
        target: u32,
        size: i32,
        usage: u32,
    },
    /// Writes the payload into the buffer bound to `target`.
    BufferSubData {
        target: u32,
        offset: i32,
    },
    BindBufferRange {
        target: u32,
        index: u32,
        buffer: A::Buffer,
        offset: i32,
        size: i32,
    },
    ActiveTexture(u32),
    BindTexture {
        target: u32,
        texture: Option<A::Texture>,
    },
    TexParameterI {
        target: u32,
        parameter: u32,
        value: i32,
    },
    TexParameterF {
        target: u32,
        parameter: u32,
        value: f32,
    },
    TexStorage2d {
        target: u32,
        levels: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    },
    /// Writes the payload into one level of the texture bound to `target`.
    TexSubImage2d {
        target: u32,
        level: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    },
    PixelStore {
        parameter: u32,
        value: i32,
    },
    SamplerParameterI {
        sampler: A::Sampler,
        parameter: u32,
        value: i32,
    },
    SamplerParameterF {
        sampler: A::Sampler,
        parameter: u32,
        value: f32,
    },
    BindSampler {
        unit: u32,
        sampler: Option<A::Sampler>,
    },
    BindRenderbuffer(Option<A::Renderbuffer>),
    RenderbufferStorageMultisample {
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    },
    BindFramebuffer {
        target: u32,
        framebuffer: Option<A::Framebuffer>,
    },
    FramebufferRenderbuffer {
        target: u32,
        attachment: u32,
        renderbuffer: Option<A::Renderbuffer>,
    },
    FramebufferTexture2d {
        target: u32,
        attachment: u32,
        texture: Option<A::Texture>,
        level: i32,
    },
    /// Copies `src` of the read framebuffer to `dst` of the draw framebuffer.
    /// Rectangles are `[x0, y0, x1, y1]`.
    BlitFramebuffer {
        src: [i32; 4],
        dst: [i32; 4],
        mask: u32,
        filter: u32,
    },
    ClearColor([f32; 4]),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(u32),
    Viewport {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    UseProgram(Option<A::Program>),
    BindVertexArray(Option<A::VertexArray>),
    VertexAttribPointer {
        location: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    EnableVertexAttribArray(u32),
    DrawArrays {
        mode: u32,
        first: i32,
        count: i32,
    },
    DrawElements {
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
    },
    Enable(u32),
    Disable(u32),
    BlendEquation(u32),
    BlendFunc {
        src: u32,
        dst: u32,
    },
    DepthFunc(u32),
    DepthMask(bool),
    CullFace(u32),
    FrontFace(u32),
}

impl<A: Api> Command<A> {
    /// Returns true for commands that change fixed-function render state,
    /// i.e. the ones emitted by the render flags tracker.
    pub fn is_render_state(&self) -> bool {
        match *self {
            Self::Enable(_)
            | Self::Disable(_)
            | Self::BlendEquation(_)
            | Self::BlendFunc { .. }
            | Self::DepthFunc(_)
            | Self::DepthMask(_)
            | Self::CullFace(_)
            | Self::FrontFace(_) => true,
            _ => false,
        }
    }

    pub fn is_clear(&self) -> bool {
        match *self {
            Self::ClearColor(_) | Self::ClearDepth(_) | Self::ClearStencil(_) | Self::Clear(_) => {
                true
            }
            _ => false,
        }
    }

    pub fn is_draw(&self) -> bool {
        match *self {
            Self::DrawArrays { .. } | Self::DrawElements { .. } => true,
            _ => false,
        }
    }
}
