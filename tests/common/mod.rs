#![allow(dead_code)]

use gfx_platform::{
    record::{self, Call},
    Command, Device, Object,
};

pub type Api = record::Api;

pub fn device() -> Device<Api> {
    let _ = env_logger::try_init();
    let desc = gft::DeviceDescriptor {
        label: Some("test"),
        flags: gft::DeviceFlags::VALIDATION,
    };
    Device::new(record::Context::new(), &desc)
}

/// Forgets everything recorded so far.
pub fn reset(device: &Device<Api>) {
    device.context().take_calls();
}

pub fn take_commands(device: &Device<Api>) -> Vec<Command<Api>> {
    device.context().take_commands()
}

/// Objects created since the last reset, in creation order.
pub fn created(calls: &[Call]) -> Vec<Object<Api>> {
    calls
        .iter()
        .filter_map(|call| match *call {
            Call::Create(object) => Some(object),
            _ => None,
        })
        .collect()
}

pub fn program_desc(uniform_buffers: &[&str], samplers: &[&str]) -> gft::ProgramDescriptor {
    gft::ProgramDescriptor {
        vertex: "#version 300 es\nvoid main() { gl_Position = vec4(0.0); }".to_string(),
        fragment: format!(
            "#version 300 es\nprecision mediump float;\n// {}\nout vec4 c;\nvoid main() {{ c = vec4(1.0); }}",
            uniform_buffers.len()
        ),
        uniform_buffers: uniform_buffers
            .iter()
            .map(|name| gft::UniformBufferLayout {
                name: name.to_string(),
                word_count: 16,
            })
            .collect(),
        samplers: samplers.iter().map(|name| name.to_string()).collect(),
    }
}

pub fn buffer_desc(word_count: u32, usage: gft::BufferUsage) -> gft::BufferDescriptor {
    gft::BufferDescriptor {
        word_count,
        usage,
        hint: gft::BufferFrequencyHint::Static,
    }
}
