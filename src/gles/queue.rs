use glow::HasContext;

use super::Api;
use crate::Command as C;

pub(super) unsafe fn process(gl: &glow::Context, command: &C<Api>, data_bytes: &[u8]) {
    match *command {
        C::BindBuffer { target, buffer } => gl.bind_buffer(target, buffer),
        C::BufferData {
            target,
            size,
            usage,
        } => gl.buffer_data_size(target, size, usage),
        C::BufferSubData { target, offset } => {
            gl.buffer_sub_data_u8_slice(target, offset, data_bytes)
        }
        C::BindBufferRange {
            target,
            index,
            buffer,
            offset,
            size,
        } => gl.bind_buffer_range(target, index, Some(buffer), offset, size),
        C::ActiveTexture(unit) => gl.active_texture(unit),
        C::BindTexture { target, texture } => gl.bind_texture(target, texture),
        C::TexParameterI {
            target,
            parameter,
            value,
        } => gl.tex_parameter_i32(target, parameter, value),
        C::TexParameterF {
            target,
            parameter,
            value,
        } => gl.tex_parameter_f32(target, parameter, value),
        C::TexStorage2d {
            target,
            levels,
            internal_format,
            width,
            height,
        } => gl.tex_storage_2d(target, levels, internal_format, width, height),
        C::TexSubImage2d {
            target,
            level,
            width,
            height,
            format,
            ty,
        } => gl.tex_sub_image_2d(
            target,
            level,
            0,
            0,
            width,
            height,
            format,
            ty,
            glow::PixelUnpackData::Slice(data_bytes),
        ),
        C::PixelStore { parameter, value } => gl.pixel_store_i32(parameter, value),
        C::SamplerParameterI {
            sampler,
            parameter,
            value,
        } => gl.sampler_parameter_i32(sampler, parameter, value),
        C::SamplerParameterF {
            sampler,
            parameter,
            value,
        } => gl.sampler_parameter_f32(sampler, parameter, value),
        C::BindSampler { unit, sampler } => gl.bind_sampler(unit, sampler),
        C::BindRenderbuffer(renderbuffer) => gl.bind_renderbuffer(glow::RENDERBUFFER, renderbuffer),
        C::RenderbufferStorageMultisample {
            samples,
            internal_format,
            width,
            height,
        } => gl.renderbuffer_storage_multisample(
            glow::RENDERBUFFER,
            samples,
            internal_format,
            width,
            height,
        ),
        C::BindFramebuffer {
            target,
            framebuffer,
        } => gl.bind_framebuffer(target, framebuffer),
        C::FramebufferRenderbuffer {
            target,
            attachment,
            renderbuffer,
        } => gl.framebuffer_renderbuffer(target, attachment, glow::RENDERBUFFER, renderbuffer),
        C::FramebufferTexture2d {
            target,
            attachment,
            texture,
            level,
        } => gl.framebuffer_texture_2d(target, attachment, glow::TEXTURE_2D, texture, level),
        C::BlitFramebuffer {
            src,
            dst,
            mask,
            filter,
        } => gl.blit_framebuffer(
            src[0], src[1], src[2], src[3], dst[0], dst[1], dst[2], dst[3], mask, filter,
        ),
        C::ClearColor(c) => gl.clear_color(c[0], c[1], c[2], c[3]),
        C::ClearDepth(depth) => gl.clear_depth_f32(depth),
        C::ClearStencil(stencil) => gl.clear_stencil(stencil),
        C::Clear(mask) => gl.clear(mask),
        C::Viewport {
            x,
            y,
            width,
            height,
        } => gl.viewport(x, y, width, height),
        C::UseProgram(program) => gl.use_program(program),
        C::BindVertexArray(vertex_array) => gl.bind_vertex_array(vertex_array),
        C::VertexAttribPointer {
            location,
            size,
            data_type,
            normalized,
            stride,
            offset,
        } => gl.vertex_attrib_pointer_f32(location, size, data_type, normalized, stride, offset),
        C::EnableVertexAttribArray(location) => gl.enable_vertex_attrib_array(location),
        C::DrawArrays { mode, first, count } => gl.draw_arrays(mode, first, count),
        C::DrawElements {
            mode,
            count,
            index_type,
            offset,
        } => gl.draw_elements(mode, count, index_type, offset),
        C::Enable(capability) => gl.enable(capability),
        C::Disable(capability) => gl.disable(capability),
        C::BlendEquation(mode) => gl.blend_equation(mode),
        C::BlendFunc { src, dst } => gl.blend_func(src, dst),
        C::DepthFunc(func) => gl.depth_func(func),
        C::DepthMask(write) => gl.depth_mask(write),
        C::CullFace(face) => gl.cull_face(face),
        C::FrontFace(face) => gl.front_face(face),
    }
}
