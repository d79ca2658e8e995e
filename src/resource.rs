use std::sync::Arc;

use gft::{BufferUsage, Format};

use crate::{conv::TextureFormatDesc, Api};

bitflags::bitflags! {
    /// Buffers cleared when a pass begins on a render target. The bits are
    /// the GL clear mask bits.
    pub struct ClearMask: u32 {
        const COLOR = glow::COLOR_BUFFER_BIT;
        const DEPTH = glow::DEPTH_BUFFER_BIT;
        const STENCIL = glow::STENCIL_BUFFER_BIT;
    }
}

#[derive(Debug)]
pub struct Buffer<A: Api> {
    pub(crate) raw: A::Buffer,
    pub(crate) target: u32,
    pub(crate) usage: BufferUsage,
    pub(crate) word_count: u32,
}

impl<A: Api> Buffer<A> {
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    pub fn byte_size(&self) -> u32 {
        self.word_count * gft::WORD_SIZE
    }

    /// Panics unless the buffer was created for `usage`.
    pub(crate) fn check_usage(&self, usage: BufferUsage) {
        assert_eq!(
            self.usage, usage,
            "{:?} buffer used where a {:?} buffer is required",
            self.usage, usage
        );
    }

    /// Panics unless `byte_count` bytes starting at word `word_offset` lie
    /// within the buffer.
    pub(crate) fn check_range(&self, word_offset: u32, byte_count: usize) {
        let start = word_offset as u64 * gft::WORD_SIZE as u64;
        let end = start + byte_count as u64;
        assert!(
            end <= self.byte_size() as u64,
            "Byte range {}..{} is out of bounds of a {} byte buffer",
            start,
            end,
            self.byte_size()
        );
    }
}

#[derive(Debug)]
pub struct Texture<A: Api> {
    pub(crate) raw: A::Texture,
    pub(crate) target: u32,
    pub(crate) format: Format,
    pub(crate) format_desc: TextureFormatDesc,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) mip_level_count: u32,
}

impl<A: Api> Texture<A> {
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }
}

#[derive(Debug)]
pub struct Sampler<A: Api> {
    pub(crate) raw: A::Sampler,
}

/// A renderbuffer with its extent, shared by both attachment kinds.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Attachment<A: Api> {
    pub(crate) raw: A::Renderbuffer,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) sample_count: u32,
}

#[derive(Debug)]
pub struct ColorAttachment<A: Api> {
    pub(crate) inner: Attachment<A>,
}

#[derive(Debug)]
pub struct DepthStencilAttachment<A: Api> {
    pub(crate) inner: Attachment<A>,
}

macro_rules! impl_attachment_extent {
    ($($ty:ident),*) => {$(
        impl<A: Api> $ty<A> {
            pub fn width(&self) -> u32 {
                self.inner.width
            }

            pub fn height(&self) -> u32 {
                self.inner.height
            }

            pub fn sample_count(&self) -> u32 {
                self.inner.sample_count
            }
        }
    )*};
}

impl_attachment_extent!(ColorAttachment, DepthStencilAttachment);

/// A framebuffer with one color and one depth/stencil attachment.
///
/// The target only refers to its attachments; destroying it leaves them
/// alive.
#[derive(Debug)]
pub struct RenderTarget<A: Api> {
    pub(crate) framebuffer: A::Framebuffer,
    pub(crate) color: Attachment<A>,
    pub(crate) clear_mask: ClearMask,
    pub(crate) clear_color: gft::Color,
    pub(crate) depth_clear_value: f32,
    pub(crate) stencil_clear_value: u8,
}

impl<A: Api> RenderTarget<A> {
    pub fn clear_mask(&self) -> ClearMask {
        self.clear_mask
    }

    pub fn width(&self) -> u32 {
        self.color.width
    }

    pub fn height(&self) -> u32 {
        self.color.height
    }
}

/// A linked program. Programs are owned by the program cache, so clones are
/// cheap and all refer to the same native object.
#[derive(Clone, Debug)]
pub struct Program<A: Api> {
    pub(crate) raw: A::Program,
    pub(crate) reflection: Arc<gft::ProgramReflection>,
}

impl<A: Api> Program<A> {
    pub fn reflection(&self) -> &gft::ProgramReflection {
        &self.reflection
    }
}

/// Index type and width resolved from an index buffer format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexDesc {
    pub index_type: u32,
    pub byte_size: u32,
}

#[derive(Debug)]
pub(crate) struct InputLayoutInner {
    pub(crate) attributes: Vec<gft::VertexAttributeDescriptor>,
    pub(crate) index: Option<IndexDesc>,
}

/// Vertex attribute layout shared by pipelines and input states.
///
/// Layouts are compared by identity: two layouts built from equal
/// descriptors are still different layouts.
#[derive(Clone, Debug)]
pub struct InputLayout {
    pub(crate) inner: Arc<InputLayoutInner>,
}

impl InputLayout {
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn attributes(&self) -> &[gft::VertexAttributeDescriptor] {
        &self.inner.attributes
    }

    pub fn index(&self) -> Option<IndexDesc> {
        self.inner.index
    }
}

/// Real buffers bound against an [`InputLayout`].
#[derive(Debug)]
pub struct InputState<A: Api> {
    pub(crate) raw: A::VertexArray,
    pub(crate) layout: InputLayout,
    pub(crate) index: Option<IndexDesc>,
}

impl<A: Api> InputState<A> {
    pub fn input_layout(&self) -> &InputLayout {
        &self.layout
    }

    pub fn has_index_buffer(&self) -> bool {
        self.index.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct RenderPipeline<A: Api> {
    pub(crate) binding_layout: gft::BindingLayoutDescriptor,
    pub(crate) program: Program<A>,
    pub(crate) draw_mode: u32,
    pub(crate) render_flags: gft::RenderFlags,
    pub(crate) input_layout: InputLayout,
}

impl<A: Api> RenderPipeline<A> {
    pub fn binding_layout(&self) -> &gft::BindingLayoutDescriptor {
        &self.binding_layout
    }

    pub fn render_flags(&self) -> &gft::RenderFlags {
        &self.render_flags
    }

    pub fn input_layout(&self) -> &InputLayout {
        &self.input_layout
    }
}

macro_rules! define_resource {
    ($($name:ident => $as:ident,)*) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ResourceKind {
            $($name,)*
            InputLayout,
        }

        /// Any resource created by a device.
        #[derive(Debug)]
        pub enum Resource<A: Api> {
            $($name($name<A>),)*
            InputLayout(InputLayout),
        }

        impl<A: Api> Resource<A> {
            pub fn kind(&self) -> ResourceKind {
                match *self {
                    $(Self::$name(_) => ResourceKind::$name,)*
                    Self::InputLayout(_) => ResourceKind::InputLayout,
                }
            }

            $(
                pub fn $as(&self) -> Option<&$name<A>> {
                    match *self {
                        Self::$name(ref inner) => Some(inner),
                        _ => None,
                    }
                }
            )*

            pub fn as_input_layout(&self) -> Option<&InputLayout> {
                match *self {
                    Self::InputLayout(ref inner) => Some(inner),
                    _ => None,
                }
            }
        }

        $(
            impl<A: Api> From<$name<A>> for Resource<A> {
                fn from(inner: $name<A>) -> Self {
                    Self::$name(inner)
                }
            }
        )*

        impl<A: Api> From<InputLayout> for Resource<A> {
            fn from(inner: InputLayout) -> Self {
                Self::InputLayout(inner)
            }
        }
    };
}

define_resource! {
    Buffer => as_buffer,
    Texture => as_texture,
    Sampler => as_sampler,
    ColorAttachment => as_color_attachment,
    DepthStencilAttachment => as_depth_stencil_attachment,
    RenderTarget => as_render_target,
    Program => as_program,
    InputState => as_input_state,
    RenderPipeline => as_render_pipeline,
}
