use std::sync::Arc;

use fxhash::FxHashMap;
use parking_lot::Mutex;

use crate::{Api, Context as _, Object, Program, ProgramError};

/// A program cache that several devices of the same context can share.
pub type SharedProgramCache<A> = Arc<Mutex<ProgramCache<A>>>;

/// Linked programs keyed by their descriptor. A descriptor is compiled at
/// most once; later requests get a clone of the same program.
pub struct ProgramCache<A: Api> {
    programs: FxHashMap<gft::ProgramDescriptor, Program<A>>,
}

impl<A: Api> ProgramCache<A> {
    pub fn new() -> Self {
        Self {
            programs: FxHashMap::default(),
        }
    }

    pub fn new_shared() -> SharedProgramCache<A> {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub(crate) fn get_or_create(
        &mut self,
        context: &A::Context,
        desc: &gft::ProgramDescriptor,
    ) -> Result<Program<A>, ProgramError> {
        if let Some(program) = self.programs.get(desc) {
            return Ok(program.clone());
        }

        let raw = unsafe { context.create_program(desc) }.map_err(|e| {
            log::error!("Program creation failed: {}", e);
            e
        })?;
        let program = Program {
            raw,
            reflection: Arc::new(gft::ProgramReflection {
                uniform_buffers: desc.uniform_buffers.clone(),
            }),
        };
        log::debug!(
            "Linked program {:?} ({} uniform buffers, {} samplers)",
            raw,
            desc.uniform_buffers.len(),
            desc.samplers.len()
        );
        self.programs.insert(desc.clone(), program.clone());
        Ok(program)
    }

    /// Deletes every cached program.
    pub(crate) fn destroy(self, context: &A::Context) {
        for (_, program) in self.programs {
            unsafe { context.delete(Object::Program(program.raw)) };
        }
    }
}
