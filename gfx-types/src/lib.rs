/*! This library describes the API surface of gfx-platform that is agnostic of the backend.
 *  Descriptors, formats and render flags live here so that renderers can
 *  build them without pulling in a backend.
 */

#![allow(
    // We don't use syntax sugar where it's not necessary.
    clippy::match_like_matches_macro,
)]
#![warn(missing_docs)]

mod format;
pub mod math;

pub use format::{Format, FormatCompFlags, FormatFlags, FormatTypeFlags};

/// Optional debug name of an object.
pub type Label<'a> = Option<&'a str>;

/// Size of one buffer word in bytes. Buffer sizes and offsets are
/// expressed in words throughout the API.
pub const WORD_SIZE: u32 = 4;

/// Largest mip chain a texture can hold (a 32768 texel wide image).
pub const MAX_MIP_LEVELS: usize = 16;

bitflags::bitflags! {
    /// Behaviour switches for a device.
    pub struct DeviceFlags: u32 {
        /// Check for native errors after every command and log them.
        const VALIDATION = 1 << 0;
    }
}

impl DeviceFlags {
    /// Validation is on in debug builds and off in release builds.
    pub fn from_build_config() -> Self {
        if cfg!(debug_assertions) {
            Self::VALIDATION
        } else {
            Self::empty()
        }
    }

    /// Overrides the flags from the `GFX_VALIDATION` environment variable
    /// (`1` enables validation, `0` disables it).
    pub fn with_env(mut self) -> Self {
        if let Some(value) = std::env::var_os("GFX_VALIDATION") {
            self.set(Self::VALIDATION, value != "0");
        }
        self
    }
}

impl Default for DeviceFlags {
    fn default() -> Self {
        Self::from_build_config()
    }
}

/// Describes a device.
#[derive(Clone, Debug, Default)]
pub struct DeviceDescriptor<L> {
    /// Debug label of the device.
    pub label: L,
    /// Behaviour switches.
    pub flags: DeviceFlags,
}

/// Limits queried from the native context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceLimits {
    /// Required alignment of uniform buffer binding offsets, in words.
    pub uniform_buffer_word_alignment: u32,
}

/// Class of a buffer, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferUsage {
    /// Source of element indices.
    Index,
    /// Source of vertex attributes.
    Vertex,
    /// Backing store of uniform blocks.
    Uniform,
}

/// How often a buffer's contents are expected to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferFrequencyHint {
    /// Written once, drawn many times.
    Static,
    /// Rewritten frequently.
    Dynamic,
}

/// Describes a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferDescriptor {
    /// Size of the buffer in words.
    pub word_count: u32,
    /// Usage class.
    pub usage: BufferUsage,
    /// Update frequency hint.
    pub hint: BufferFrequencyHint,
}

/// Describes a 2D texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureDescriptor {
    /// Texel format.
    pub format: Format,
    /// Width of level 0.
    pub width: u32,
    /// Height of level 0.
    pub height: u32,
    /// Allocate a full mip chain instead of a single level.
    pub mipmapped: bool,
    /// Sample count; only 1 is supported for textures.
    pub sample_count: u32,
}

/// Texture coordinate addressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapMode {
    /// Clamp to the edge texel.
    Clamp,
    /// Tile.
    Repeat,
    /// Tile, mirroring every other repetition.
    Mirror,
}

/// Texel filtering within one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TexFilterMode {
    /// Nearest texel.
    Point,
    /// Linear blend of the four nearest texels.
    Bilinear,
}

/// Filtering between mip levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MipFilterMode {
    /// Only level 0 is sampled.
    NoMip,
    /// Nearest level.
    Nearest,
    /// Linear blend of the two nearest levels.
    Linear,
}

/// Describes a sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerDescriptor {
    /// Horizontal addressing.
    pub wrap_s: WrapMode,
    /// Vertical addressing.
    pub wrap_t: WrapMode,
    /// Minification filter.
    pub min_filter: TexFilterMode,
    /// Magnification filter.
    pub mag_filter: TexFilterMode,
    /// Filtering between levels, applied on minification.
    pub mip_filter: MipFilterMode,
    /// Lowest level of detail.
    pub min_lod: f32,
    /// Highest level of detail.
    pub max_lod: f32,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            min_filter: TexFilterMode::Point,
            mag_filter: TexFilterMode::Point,
            mip_filter: MipFilterMode::NoMip,
            min_lod: -1000.0,
            max_lod: 1000.0,
        }
    }
}

/// Whether an attachment is cleared or preserved when a pass begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadDisposition {
    /// Clear to the render target's clear value.
    Clear,
    /// Keep the previous contents.
    Load,
}

/// RGBA color with floating point channels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// (0, 0, 0, 0)
    pub const TRANSPARENT_BLACK: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// (0, 0, 0, 1)
    pub const OPAQUE_BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// (1, 1, 1, 1)
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Builds a color from its channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in r, g, b, a order.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// How vertices are assembled into primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveTopology {
    /// Every vertex is a point.
    Points,
    /// Every two vertices form a line.
    Lines,
    /// Consecutive vertices form a connected line.
    LineStrip,
    /// Every three vertices form a triangle.
    Triangles,
    /// Each vertex after the second forms a triangle with the previous two.
    TriangleStrip,
}

/// Number of uniform buffer and sampler slots a pipeline expects per draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingLayoutDescriptor {
    /// Uniform buffer slots, bound to uniform block bindings `0..n`.
    pub num_uniform_buffers: u32,
    /// Sampler slots, bound to texture units `0..n`.
    pub num_samplers: u32,
}

/// One vertex attribute of an input layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexAttributeDescriptor {
    /// Shader attribute location.
    pub location: u32,
    /// Attribute format.
    pub format: Format,
    /// Index into the vertex buffers given to the input state.
    pub buffer_index: u32,
    /// Offset of the attribute within one vertex, in bytes.
    pub buffer_byte_offset: u32,
}

/// Describes an input layout.
#[derive(Clone, Copy, Debug)]
pub struct InputLayoutDescriptor<'a> {
    /// Vertex attributes.
    pub attributes: &'a [VertexAttributeDescriptor],
    /// Format of the index buffer, if indexed draws are used.
    pub index_buffer_format: Option<Format>,
}

/// Contents of a texture's mip chain, level 0 first.
#[derive(Clone, Copy, Debug)]
pub struct TextureMipChain<'a> {
    /// Tightly packed texel data of each level.
    pub mip_levels: &'a [&'a [u8]],
}

/// A uniform block declared by a program.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformBufferLayout {
    /// Name of the uniform block in the shader source.
    pub name: String,
    /// Size of the block in words.
    pub word_count: u32,
}

/// Describes a program: GLSL sources plus the interface the renderer
/// expects from them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgramDescriptor {
    /// Vertex stage source.
    pub vertex: String,
    /// Fragment stage source.
    pub fragment: String,
    /// Uniform blocks, in binding order.
    pub uniform_buffers: Vec<UniformBufferLayout>,
    /// Sampler uniform names, in texture unit order.
    pub samplers: Vec<String>,
}

/// Interface of a compiled program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgramReflection {
    /// Uniform blocks, in binding order.
    pub uniform_buffers: Vec<UniformBufferLayout>,
}

/// Blend equation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    /// Blending disabled.
    None,
    /// `src + dst`
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    ReverseSubtract,
}

/// Blend factor applied to the source or destination color.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Comparison function.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareMode {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Faces discarded by the rasterizer.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CullMode {
    None,
    Front,
    Back,
    FrontAndBack,
}

/// Winding of front-facing triangles.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrontFaceMode {
    Ccw,
    Cw,
}

/// Rasterization, blend and depth state of a pipeline.
///
/// The default value is the initial state of a fresh GL context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderFlags {
    /// Blend equation, or `None` to disable blending.
    pub blend_mode: BlendMode,
    /// Source blend factor.
    pub blend_src: BlendFactor,
    /// Destination blend factor.
    pub blend_dst: BlendFactor,
    /// Depth testing enabled.
    pub depth_test: bool,
    /// Depth comparison.
    pub depth_func: CompareMode,
    /// Depth writes enabled.
    pub depth_write: bool,
    /// Culled faces.
    pub cull_mode: CullMode,
    /// Front face winding.
    pub front_face: FrontFaceMode,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::None,
            blend_src: BlendFactor::One,
            blend_dst: BlendFactor::Zero,
            depth_test: false,
            depth_func: CompareMode::Less,
            depth_write: true,
            cull_mode: CullMode::None,
            front_face: FrontFaceMode::Ccw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_validation() {
        std::env::set_var("GFX_VALIDATION", "0");
        assert!(!DeviceFlags::VALIDATION.with_env().contains(DeviceFlags::VALIDATION));
        std::env::set_var("GFX_VALIDATION", "1");
        assert!(DeviceFlags::empty().with_env().contains(DeviceFlags::VALIDATION));
        std::env::remove_var("GFX_VALIDATION");
        assert_eq!(DeviceFlags::empty().with_env(), DeviceFlags::empty());
    }

    #[test]
    fn clear_color_channel_order() {
        assert_eq!(Color::new(0.1, 0.2, 0.3, 0.4).to_array(), [0.1, 0.2, 0.3, 0.4]);
    }
}
