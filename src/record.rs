//! A backend that runs no GL at all and records every call instead.
//!
//! Handles are plain integers. Buffer storage is emulated so that uploads
//! can be read back, and parameters can be overridden to emulate a
//! particular driver.

use fxhash::FxHashMap;
use parking_lot::Mutex;

use crate::{Command, DeviceError, Object, ProgramError};

pub type Handle = u32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Api;

impl crate::Api for Api {
    type Context = Context;

    type Buffer = Handle;
    type Texture = Handle;
    type Sampler = Handle;
    type Renderbuffer = Handle;
    type Framebuffer = Handle;
    type VertexArray = Handle;
    type Program = Handle;
}

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create(Object<Api>),
    Delete(Object<Api>),
    /// A processed command with the length of its payload.
    Command(Command<Api>, usize),
    ReadBuffer {
        target: u32,
        offset: i32,
        size: usize,
    },
}

#[derive(Default)]
struct State {
    next_handle: Handle,
    failing_creations: usize,
    calls: Vec<Call>,
    parameters: FxHashMap<u32, i32>,
    bound_buffers: FxHashMap<u32, Handle>,
    buffer_contents: FxHashMap<Handle, Vec<u8>>,
}

impl State {
    fn allocate(&mut self) -> Handle {
        self.next_handle += 1;
        self.next_handle
    }

    fn bound_contents(&mut self, target: u32) -> &mut Vec<u8> {
        let buffer = match self.bound_buffers.get(&target) {
            Some(&buffer) => buffer,
            None => panic!("No buffer bound to {:#x}", target),
        };
        self.buffer_contents.entry(buffer).or_default()
    }

    fn apply(&mut self, command: &Command<Api>, data: &[u8]) {
        match *command {
            Command::BindBuffer { target, buffer } => match buffer {
                Some(buffer) => {
                    self.bound_buffers.insert(target, buffer);
                }
                None => {
                    self.bound_buffers.remove(&target);
                }
            },
            Command::BindBufferRange { target, buffer, .. } => {
                self.bound_buffers.insert(target, buffer);
            }
            Command::BufferData { target, size, .. } => {
                *self.bound_contents(target) = vec![0; size as usize];
            }
            Command::BufferSubData { target, offset } => {
                let contents = self.bound_contents(target);
                let start = offset as usize;
                contents[start..start + data.len()].copy_from_slice(data);
            }
            _ => {}
        }
    }
}

/// Records calls in memory. Interior mutability lets the device drive it
/// through `&self` like a real context.
pub struct Context {
    state: Mutex<State>,
}

impl Context {
    pub fn new() -> Self {
        let mut parameters = FxHashMap::default();
        parameters.insert(glow::UNIFORM_BUFFER_OFFSET_ALIGNMENT, 256);
        Self {
            state: Mutex::new(State {
                parameters,
                ..State::default()
            }),
        }
    }

    /// Overrides the value returned for `parameter`.
    pub fn set_parameter(&self, parameter: u32, value: i32) {
        self.state.lock().parameters.insert(parameter, value);
    }

    /// Makes the next `count` object creations fail with
    /// [`DeviceError::OutOfMemory`].
    pub fn fail_next_creations(&self, count: usize) {
        self.state.lock().failing_creations = count;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Returns the calls recorded so far and forgets them.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// Like [`Context::take_calls`], keeping only processed commands.
    pub fn take_commands(&self) -> Vec<Command<Api>> {
        self.take_calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Command(command, _) => Some(command),
                _ => None,
            })
            .collect()
    }

    fn create(&self, wrap: fn(Handle) -> Object<Api>) -> Result<Handle, DeviceError> {
        let mut state = self.state.lock();
        if state.failing_creations > 0 {
            state.failing_creations -= 1;
            return Err(DeviceError::OutOfMemory);
        }
        let handle = state.allocate();
        state.calls.push(Call::Create(wrap(handle)));
        Ok(handle)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::Context<Api> for Context {
    unsafe fn create_buffer(&self) -> Result<Handle, DeviceError> {
        self.create(Object::Buffer)
    }
    unsafe fn create_texture(&self) -> Result<Handle, DeviceError> {
        self.create(Object::Texture)
    }
    unsafe fn create_sampler(&self) -> Result<Handle, DeviceError> {
        self.create(Object::Sampler)
    }
    unsafe fn create_renderbuffer(&self) -> Result<Handle, DeviceError> {
        self.create(Object::Renderbuffer)
    }
    unsafe fn create_framebuffer(&self) -> Result<Handle, DeviceError> {
        self.create(Object::Framebuffer)
    }
    unsafe fn create_vertex_array(&self) -> Result<Handle, DeviceError> {
        self.create(Object::VertexArray)
    }

    unsafe fn create_program(&self, desc: &gft::ProgramDescriptor) -> Result<Handle, ProgramError> {
        if desc.vertex.trim().is_empty() {
            return Err(ProgramError::Compilation("empty vertex shader".to_string()));
        }
        if desc.fragment.trim().is_empty() {
            return Err(ProgramError::Compilation(
                "empty fragment shader".to_string(),
            ));
        }
        self.create(Object::Program).map_err(ProgramError::from)
    }

    unsafe fn delete(&self, object: Object<Api>) {
        let mut state = self.state.lock();
        if let Object::Buffer(buffer) = object {
            state.buffer_contents.remove(&buffer);
        }
        state.calls.push(Call::Delete(object));
    }

    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32 {
        self.state
            .lock()
            .parameters
            .get(&parameter)
            .copied()
            .unwrap_or(0)
    }

    unsafe fn get_error(&self) -> u32 {
        glow::NO_ERROR
    }

    unsafe fn get_buffer_sub_data(&self, target: u32, offset: i32, dst: &mut [u8]) {
        let mut state = self.state.lock();
        state.calls.push(Call::ReadBuffer {
            target,
            offset,
            size: dst.len(),
        });
        let start = offset as usize;
        let contents = state.bound_contents(target);
        dst.copy_from_slice(&contents[start..start + dst.len()]);
    }

    unsafe fn process(&self, command: &Command<Api>, data: &[u8]) {
        let mut state = self.state.lock();
        state.apply(command, data);
        state.calls.push(Call::Command(command.clone(), data.len()));
    }
}
