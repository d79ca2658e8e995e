//! Translation of backend-agnostic descriptions into GL enums.

use gft::{Format, FormatTypeFlags};

/// How a vertex attribute is fed to `glVertexAttribPointer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexFormatDesc {
    pub size: i32,
    pub data_type: u32,
    pub normalized: bool,
}

/// Internal format, external format and data type of a texture format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureFormatDesc {
    pub internal: u32,
    pub external: u32,
    pub data_type: u32,
}

fn map_type_flags(ty: FormatTypeFlags) -> u32 {
    match ty {
        FormatTypeFlags::U8 => glow::UNSIGNED_BYTE,
        FormatTypeFlags::U16 => glow::UNSIGNED_SHORT,
        FormatTypeFlags::U32 => glow::UNSIGNED_INT,
        FormatTypeFlags::S8 => glow::BYTE,
        FormatTypeFlags::S16 => glow::SHORT,
        FormatTypeFlags::S32 => glow::INT,
        FormatTypeFlags::F32 => glow::FLOAT,
    }
}

pub fn map_vertex_format(format: Format) -> VertexFormatDesc {
    VertexFormatDesc {
        size: format.component_count() as i32,
        data_type: map_type_flags(format.type_flags()),
        normalized: format.is_normalized(),
    }
}

pub fn map_index_format(format: Format) -> u32 {
    match format {
        Format::U16_R => glow::UNSIGNED_SHORT,
        other => panic!("Unsupported index buffer format {:?}", other),
    }
}

pub fn describe_texture_format(format: Format) -> TextureFormatDesc {
    let (internal, external, data_type) = match format {
        Format::U8_R_NORM => (glow::R8, glow::RED, glow::UNSIGNED_BYTE),
        Format::U8_RG_NORM => (glow::RG8, glow::RG, glow::UNSIGNED_BYTE),
        Format::U8_RGBA | Format::U8_RGBA_NORM => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        Format::U16_R => (glow::R16UI, glow::RED_INTEGER, glow::UNSIGNED_SHORT),
        Format::F32_R => (glow::R32F, glow::RED, glow::FLOAT),
        Format::F32_RG => (glow::RG32F, glow::RG, glow::FLOAT),
        Format::F32_RGB => (glow::RGB32F, glow::RGB, glow::FLOAT),
        Format::F32_RGBA => (glow::RGBA32F, glow::RGBA, glow::FLOAT),
        other => panic!("Unsupported texture format {:?}", other),
    };
    TextureFormatDesc {
        internal,
        external,
        data_type,
    }
}

pub fn map_wrap_mode(mode: gft::WrapMode) -> u32 {
    match mode {
        gft::WrapMode::Clamp => glow::CLAMP_TO_EDGE,
        gft::WrapMode::Repeat => glow::REPEAT,
        gft::WrapMode::Mirror => glow::MIRRORED_REPEAT,
    }
}

pub fn map_filter_mode(filter: gft::TexFilterMode, mip: gft::MipFilterMode) -> u32 {
    use gft::{MipFilterMode as Mfm, TexFilterMode as Tfm};
    match (filter, mip) {
        (Tfm::Point, Mfm::NoMip) => glow::NEAREST,
        (Tfm::Bilinear, Mfm::NoMip) => glow::LINEAR,
        (Tfm::Point, Mfm::Nearest) => glow::NEAREST_MIPMAP_NEAREST,
        (Tfm::Bilinear, Mfm::Nearest) => glow::LINEAR_MIPMAP_NEAREST,
        (Tfm::Point, Mfm::Linear) => glow::NEAREST_MIPMAP_LINEAR,
        (Tfm::Bilinear, Mfm::Linear) => glow::LINEAR_MIPMAP_LINEAR,
    }
}

pub fn map_primitive_topology(topology: gft::PrimitiveTopology) -> u32 {
    use gft::PrimitiveTopology as Pt;
    match topology {
        Pt::Points => glow::POINTS,
        Pt::Lines => glow::LINES,
        Pt::LineStrip => glow::LINE_STRIP,
        Pt::Triangles => glow::TRIANGLES,
        Pt::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

/// Bind target of a buffer usage class.
pub fn map_buffer_usage(usage: gft::BufferUsage) -> u32 {
    match usage {
        gft::BufferUsage::Index => glow::ELEMENT_ARRAY_BUFFER,
        gft::BufferUsage::Vertex => glow::ARRAY_BUFFER,
        gft::BufferUsage::Uniform => glow::UNIFORM_BUFFER,
    }
}

pub fn map_frequency_hint(hint: gft::BufferFrequencyHint) -> u32 {
    match hint {
        gft::BufferFrequencyHint::Static => glow::STATIC_DRAW,
        gft::BufferFrequencyHint::Dynamic => glow::DYNAMIC_DRAW,
    }
}

pub fn map_compare_mode(mode: gft::CompareMode) -> u32 {
    use gft::CompareMode as Cm;
    match mode {
        Cm::Never => glow::NEVER,
        Cm::Less => glow::LESS,
        Cm::Equal => glow::EQUAL,
        Cm::LessEqual => glow::LEQUAL,
        Cm::Greater => glow::GREATER,
        Cm::NotEqual => glow::NOTEQUAL,
        Cm::GreaterEqual => glow::GEQUAL,
        Cm::Always => glow::ALWAYS,
    }
}

/// Blend equation of a mode, or `None` when blending is disabled.
pub fn map_blend_mode(mode: gft::BlendMode) -> Option<u32> {
    match mode {
        gft::BlendMode::None => None,
        gft::BlendMode::Add => Some(glow::FUNC_ADD),
        gft::BlendMode::Subtract => Some(glow::FUNC_SUBTRACT),
        gft::BlendMode::ReverseSubtract => Some(glow::FUNC_REVERSE_SUBTRACT),
    }
}

pub fn map_blend_factor(factor: gft::BlendFactor) -> u32 {
    use gft::BlendFactor as Bf;
    match factor {
        Bf::Zero => glow::ZERO,
        Bf::One => glow::ONE,
        Bf::SrcColor => glow::SRC_COLOR,
        Bf::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        Bf::DstColor => glow::DST_COLOR,
        Bf::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        Bf::SrcAlpha => glow::SRC_ALPHA,
        Bf::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        Bf::DstAlpha => glow::DST_ALPHA,
        Bf::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
    }
}

/// Culled face, or `None` when culling is disabled.
pub fn map_cull_mode(mode: gft::CullMode) -> Option<u32> {
    match mode {
        gft::CullMode::None => None,
        gft::CullMode::Front => Some(glow::FRONT),
        gft::CullMode::Back => Some(glow::BACK),
        gft::CullMode::FrontAndBack => Some(glow::FRONT_AND_BACK),
    }
}

pub fn map_front_face(mode: gft::FrontFaceMode) -> u32 {
    match mode {
        gft::FrontFaceMode::Ccw => glow::CCW,
        gft::FrontFaceMode::Cw => glow::CW,
    }
}
