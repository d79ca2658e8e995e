/*! This library is an immediate-mode hardware abstraction layer over GLES 3.0 / WebGL2.
 *  Renderers describe buffers, textures, pipelines and passes with the
 *  backend-agnostic types of `gfx-platform-types`, and the HAL translates and
 *  executes them right away, with the following properties:
 *  - Every call runs its native commands before returning. There are no
 *    command buffers and no deferred submission.
 *  - Native calls go through the narrow [`Context`] trait, so the same
 *    device logic runs on a real GL context ([`gles`]) or on the in-memory
 *    [`record`] backend.
 *  - Misuse (usage class, layout identity, binding counts, dimensions) is a
 *    programmer error and panics immediately. Only native failures are
 *    reported through `Result`.
 *  - Resources are destroyed explicitly by value. Dropping a handle without
 *    destroying it leaks the native object.
 */

#![allow(
    // We don't use syntax sugar where it's not necessary.
    clippy::match_like_matches_macro,
    // Redundant matching is more explicit.
    clippy::redundant_pattern_matching,
    // Explicit lifetimes are often easier to reason about.
    clippy::needless_lifetimes,
    // No need for defaults in the internal types.
    clippy::new_without_default,
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_qualifications
)]

mod command;
pub mod conv;
mod device;
mod flags;
pub mod gles;
mod pass;
mod program;
pub mod record;
mod resource;
mod swap_chain;

pub use command::Command;
pub use device::Device;
pub use flags::{ApplyFlagsOptions, RenderFlagsTracker, MAX_FLAG_COMMANDS};
pub use pass::{PassPhase, PassRenderer};
pub use program::{ProgramCache, SharedProgramCache};
pub use resource::{
    Buffer, ClearMask, ColorAttachment, DepthStencilAttachment, IndexDesc, InputLayout,
    InputState, Program, RenderPipeline, RenderTarget, Resource, ResourceKind, Sampler, Texture,
};
pub use swap_chain::SwapChain;

use std::fmt;

use thiserror::Error;

/// Largest number of sampler slots a binding layout may declare. Fragment
/// shaders are guaranteed 16 texture units.
pub const MAX_SAMPLERS: u32 = 16;

/// Texture unit used while creating and filling textures, so that uploads
/// never disturb the units of a binding layout. WebGL2 guarantees 32
/// combined units.
pub const TRANSFER_TEXTURE_UNIT: u32 = 31;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum DeviceError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("device is lost")]
    Lost,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProgramError {
    #[error("compilation failed: {0:?}")]
    Compilation(String),
    #[error("linkage failed: {0:?}")]
    Linkage(String),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A backend: the native context and the handle types it hands out.
pub trait Api: Clone + Copy + fmt::Debug + PartialEq + Sized + 'static {
    type Context: Context<Self>;

    type Buffer: Copy + fmt::Debug + PartialEq;
    type Texture: Copy + fmt::Debug + PartialEq;
    type Sampler: Copy + fmt::Debug + PartialEq;
    type Renderbuffer: Copy + fmt::Debug + PartialEq;
    type Framebuffer: Copy + fmt::Debug + PartialEq;
    type VertexArray: Copy + fmt::Debug + PartialEq;
    type Program: Copy + fmt::Debug + PartialEq;
}

/// Any native object, for deletion and bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Object<A: Api> {
    Buffer(A::Buffer),
    Texture(A::Texture),
    Sampler(A::Sampler),
    Renderbuffer(A::Renderbuffer),
    Framebuffer(A::Framebuffer),
    VertexArray(A::VertexArray),
    Program(A::Program),
}

/// The native calls the HAL needs from a backend.
///
/// # Safety
///
/// Every handle passed to these functions must have been created by the same
/// context and not deleted yet. [`Device`] upholds this as long as resources
/// are not moved between devices.
pub trait Context<A: Api> {
    unsafe fn create_buffer(&self) -> Result<A::Buffer, DeviceError>;
    unsafe fn create_texture(&self) -> Result<A::Texture, DeviceError>;
    unsafe fn create_sampler(&self) -> Result<A::Sampler, DeviceError>;
    unsafe fn create_renderbuffer(&self) -> Result<A::Renderbuffer, DeviceError>;
    unsafe fn create_framebuffer(&self) -> Result<A::Framebuffer, DeviceError>;
    unsafe fn create_vertex_array(&self) -> Result<A::VertexArray, DeviceError>;
    /// Compiles and links a program, binding uniform block `i` to binding
    /// point `i` and sampler uniform `i` to texture unit `i`.
    unsafe fn create_program(
        &self,
        desc: &gft::ProgramDescriptor,
    ) -> Result<A::Program, ProgramError>;
    unsafe fn delete(&self, object: Object<A>);

    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32;
    unsafe fn get_error(&self) -> u32;
    /// Reads back from the buffer currently bound to `target`.
    unsafe fn get_buffer_sub_data(&self, target: u32, offset: i32, dst: &mut [u8]);

    /// Runs one command. `data` is the payload of upload commands and empty
    /// for everything else.
    unsafe fn process(&self, command: &Command<A>, data: &[u8]);
}

/// Describes a render target: one color and one depth/stencil attachment
/// plus what happens to each channel when a pass begins.
#[derive(Clone, Copy, Debug)]
pub struct RenderTargetDescriptor<'a, A: Api> {
    pub color_attachment: &'a ColorAttachment<A>,
    pub depth_stencil_attachment: &'a DepthStencilAttachment<A>,
    pub color_load_disposition: gft::LoadDisposition,
    pub depth_load_disposition: gft::LoadDisposition,
    pub stencil_load_disposition: gft::LoadDisposition,
    pub color_clear_color: gft::Color,
    pub depth_clear_value: f32,
    pub stencil_clear_value: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderPipelineDescriptor<'a, A: Api> {
    pub binding_layout: gft::BindingLayoutDescriptor,
    pub program: &'a Program<A>,
    pub topology: gft::PrimitiveTopology,
    pub render_flags: gft::RenderFlags,
    pub input_layout: &'a InputLayout,
}

/// A vertex buffer bound to an input state.
#[derive(Clone, Copy, Debug)]
pub struct VertexBufferDescriptor<'a, A: Api> {
    pub buffer: &'a Buffer<A>,
    /// Offset of the first vertex, in bytes.
    pub byte_offset: u32,
    /// Distance between consecutive vertices, in bytes.
    pub byte_stride: u32,
}

/// A range of a uniform buffer bound to one uniform block slot.
#[derive(Clone, Copy, Debug)]
pub struct BufferBinding<'a, A: Api> {
    pub buffer: &'a Buffer<A>,
    pub word_offset: u32,
    pub word_count: u32,
}

/// A texture and the sampler used to read it, bound to one sampler slot.
#[derive(Clone, Copy, Debug)]
pub struct SamplerBinding<'a, A: Api> {
    pub texture: &'a Texture<A>,
    pub sampler: &'a Sampler<A>,
}
