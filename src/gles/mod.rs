/*!
# OpenGL ES3 / WebGL2 backend

Runs every command on a `glow::Context` as soon as the device issues it.
Creating the context (EGL, a canvas, or anything else `glow` accepts) is up
to the caller.
*/

mod queue;

use arrayvec::ArrayVec;
use glow::HasContext;

use crate::{DeviceError, Object, ProgramError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Api;

impl crate::Api for Api {
    type Context = Context;

    type Buffer = <glow::Context as HasContext>::Buffer;
    type Texture = <glow::Context as HasContext>::Texture;
    type Sampler = <glow::Context as HasContext>::Sampler;
    type Renderbuffer = <glow::Context as HasContext>::Renderbuffer;
    type Framebuffer = <glow::Context as HasContext>::Framebuffer;
    type VertexArray = <glow::Context as HasContext>::VertexArray;
    type Program = <glow::Context as HasContext>::Program;
}

pub struct Context {
    gl: glow::Context,
}

impl Context {
    pub fn new(gl: glow::Context) -> Self {
        unsafe {
            log::info!(
                "GL context: {} on {} ({})",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VENDOR),
            );
        }
        Self { gl }
    }

    pub fn glow_context(&self) -> &glow::Context {
        &self.gl
    }

    pub fn into_inner(self) -> glow::Context {
        self.gl
    }
}

pub fn create_device(
    gl: glow::Context,
    desc: &gft::DeviceDescriptor<gft::Label>,
) -> crate::Device<Api> {
    crate::Device::new(Context::new(gl), desc)
}

/// Creates a device on `gl` and a swap chain presenting to its default
/// framebuffer.
pub fn create_swap_chain(
    gl: glow::Context,
    desc: &gft::DeviceDescriptor<gft::Label>,
) -> Result<crate::SwapChain<Api>, ProgramError> {
    crate::SwapChain::new(create_device(gl, desc))
}

fn map_creation_error(kind: &str, message: String) -> DeviceError {
    log::error!("Failed to create {}: {}", kind, message);
    DeviceError::OutOfMemory
}

impl Context {
    unsafe fn compile_shader(
        &self,
        stage: u32,
        source: &str,
    ) -> Result<glow::Shader, ProgramError> {
        let gl = &self.gl;
        let shader = gl
            .create_shader(stage)
            .map_err(|e| map_creation_error("shader", e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let msg = gl.get_shader_info_log(shader);
            log::error!("\tShader compilation failed: {}", msg);
            gl.delete_shader(shader);
            return Err(ProgramError::Compilation(msg));
        }
        let msg = gl.get_shader_info_log(shader);
        if !msg.is_empty() {
            log::warn!("\tCompile: {}", msg);
        }
        Ok(shader)
    }

    unsafe fn link_program(
        &self,
        desc: &gft::ProgramDescriptor,
    ) -> Result<glow::Program, ProgramError> {
        let gl = &self.gl;
        let program = gl
            .create_program()
            .map_err(|e| map_creation_error("program", e))?;

        let mut shaders = ArrayVec::<glow::Shader, 2>::new();
        for &(stage, source) in [
            (glow::VERTEX_SHADER, &desc.vertex),
            (glow::FRAGMENT_SHADER, &desc.fragment),
        ]
        .iter()
        {
            match self.compile_shader(stage, source) {
                Ok(shader) => {
                    gl.attach_shader(program, shader);
                    shaders.push(shader);
                }
                Err(e) => {
                    for shader in shaders {
                        gl.delete_shader(shader);
                    }
                    gl.delete_program(program);
                    return Err(e);
                }
            }
        }

        gl.link_program(program);
        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }

        if !gl.get_program_link_status(program) {
            let msg = gl.get_program_info_log(program);
            log::error!("\tLinking failed: {}", msg);
            gl.delete_program(program);
            return Err(ProgramError::Linkage(msg));
        }
        let msg = gl.get_program_info_log(program);
        if !msg.is_empty() {
            log::warn!("\tLink: {}", msg);
        }
        Ok(program)
    }
}

impl crate::Context<Api> for Context {
    unsafe fn create_buffer(&self) -> Result<glow::Buffer, DeviceError> {
        self.gl
            .create_buffer()
            .map_err(|e| map_creation_error("buffer", e))
    }
    unsafe fn create_texture(&self) -> Result<glow::Texture, DeviceError> {
        self.gl
            .create_texture()
            .map_err(|e| map_creation_error("texture", e))
    }
    unsafe fn create_sampler(&self) -> Result<glow::Sampler, DeviceError> {
        self.gl
            .create_sampler()
            .map_err(|e| map_creation_error("sampler", e))
    }
    unsafe fn create_renderbuffer(&self) -> Result<glow::Renderbuffer, DeviceError> {
        self.gl
            .create_renderbuffer()
            .map_err(|e| map_creation_error("renderbuffer", e))
    }
    unsafe fn create_framebuffer(&self) -> Result<glow::Framebuffer, DeviceError> {
        self.gl
            .create_framebuffer()
            .map_err(|e| map_creation_error("framebuffer", e))
    }
    unsafe fn create_vertex_array(&self) -> Result<glow::VertexArray, DeviceError> {
        self.gl
            .create_vertex_array()
            .map_err(|e| map_creation_error("vertex array", e))
    }

    unsafe fn create_program(
        &self,
        desc: &gft::ProgramDescriptor,
    ) -> Result<glow::Program, ProgramError> {
        let gl = &self.gl;
        let program = self.link_program(desc)?;

        for (binding, layout) in desc.uniform_buffers.iter().enumerate() {
            match gl.get_uniform_block_index(program, &layout.name) {
                Some(index) => gl.uniform_block_binding(program, index, binding as u32),
                None => log::warn!("Uniform block {:?} is not active", layout.name),
            }
        }

        gl.use_program(Some(program));
        for (unit, name) in desc.samplers.iter().enumerate() {
            match gl.get_uniform_location(program, name) {
                Some(location) => gl.uniform_1_i32(Some(&location), unit as i32),
                None => log::warn!("Sampler {:?} is not active", name),
            }
        }
        gl.use_program(None);

        Ok(program)
    }

    unsafe fn delete(&self, object: Object<Api>) {
        let gl = &self.gl;
        match object {
            Object::Buffer(raw) => gl.delete_buffer(raw),
            Object::Texture(raw) => gl.delete_texture(raw),
            Object::Sampler(raw) => gl.delete_sampler(raw),
            Object::Renderbuffer(raw) => gl.delete_renderbuffer(raw),
            Object::Framebuffer(raw) => gl.delete_framebuffer(raw),
            Object::VertexArray(raw) => gl.delete_vertex_array(raw),
            Object::Program(raw) => gl.delete_program(raw),
        }
    }

    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32 {
        self.gl.get_parameter_i32(parameter)
    }

    unsafe fn get_error(&self) -> u32 {
        self.gl.get_error()
    }

    unsafe fn get_buffer_sub_data(&self, target: u32, offset: i32, dst: &mut [u8]) {
        self.gl.get_buffer_sub_data(target, offset, dst);
    }

    unsafe fn process(&self, command: &crate::Command<Api>, data: &[u8]) {
        queue::process(&self.gl, command, data);
    }
}
