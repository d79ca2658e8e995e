use arrayvec::ArrayVec;
use gft::{BlendMode, CullMode, RenderFlags};

use crate::{conv, Api, Command};

/// Upper bound of the commands a single transition can produce:
/// blend enable + equation, blend func, depth test, depth func, depth mask,
/// cull enable + face, front face.
pub const MAX_FLAG_COMMANDS: usize = 9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyFlagsOptions {
    /// Apply the flags as if their cull mode were `None`.
    pub force_disable_culling: bool,
}

/// Remembers the render flags last applied to the context so that only the
/// fields that differ are re-issued.
///
/// The blend equation and cull face are tracked on their own, because GL
/// keeps them while blending or culling is disabled.
#[derive(Debug)]
pub struct RenderFlagsTracker {
    current: RenderFlags,
    blend_equation: u32,
    cull_face: u32,
}

impl RenderFlagsTracker {
    /// Starts from the state of a fresh context.
    pub fn new() -> Self {
        Self {
            current: RenderFlags::default(),
            blend_equation: glow::FUNC_ADD,
            cull_face: glow::BACK,
        }
    }

    pub fn current(&self) -> &RenderFlags {
        &self.current
    }

    /// Computes the commands that move the context from the current state to
    /// `target` and records the new state.
    pub fn transition<A: Api>(
        &mut self,
        target: &RenderFlags,
        options: ApplyFlagsOptions,
    ) -> ArrayVec<Command<A>, MAX_FLAG_COMMANDS> {
        let mut effective = *target;
        if options.force_disable_culling {
            effective.cull_mode = CullMode::None;
        }
        let commands = self.diff(&effective);
        self.current = effective;
        commands
    }

    fn diff<A: Api>(&mut self, new: &RenderFlags) -> ArrayVec<Command<A>, MAX_FLAG_COMMANDS> {
        let cur = self.current;
        let mut commands = ArrayVec::new();

        if cur.blend_mode != new.blend_mode {
            match conv::map_blend_mode(new.blend_mode) {
                None => commands.push(Command::Disable(glow::BLEND)),
                Some(equation) => {
                    if cur.blend_mode == BlendMode::None {
                        commands.push(Command::Enable(glow::BLEND));
                    }
                    if equation != self.blend_equation {
                        commands.push(Command::BlendEquation(equation));
                        self.blend_equation = equation;
                    }
                }
            }
        }
        if cur.blend_src != new.blend_src || cur.blend_dst != new.blend_dst {
            commands.push(Command::BlendFunc {
                src: conv::map_blend_factor(new.blend_src),
                dst: conv::map_blend_factor(new.blend_dst),
            });
        }

        if cur.depth_test != new.depth_test {
            commands.push(if new.depth_test {
                Command::Enable(glow::DEPTH_TEST)
            } else {
                Command::Disable(glow::DEPTH_TEST)
            });
        }
        if cur.depth_func != new.depth_func {
            commands.push(Command::DepthFunc(conv::map_compare_mode(new.depth_func)));
        }
        if cur.depth_write != new.depth_write {
            commands.push(Command::DepthMask(new.depth_write));
        }

        if cur.cull_mode != new.cull_mode {
            match conv::map_cull_mode(new.cull_mode) {
                None => commands.push(Command::Disable(glow::CULL_FACE)),
                Some(face) => {
                    if cur.cull_mode == CullMode::None {
                        commands.push(Command::Enable(glow::CULL_FACE));
                    }
                    if face != self.cull_face {
                        commands.push(Command::CullFace(face));
                        self.cull_face = face;
                    }
                }
            }
        }
        if cur.front_face != new.front_face {
            commands.push(Command::FrontFace(conv::map_front_face(new.front_face)));
        }

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Api as Record;
    use gft::{BlendFactor, CompareMode, FrontFaceMode};

    fn transition(
        tracker: &mut RenderFlagsTracker,
        flags: &RenderFlags,
    ) -> Vec<Command<Record>> {
        tracker
            .transition(flags, ApplyFlagsOptions::default())
            .into_iter()
            .collect()
    }

    #[test]
    fn applying_the_same_flags_twice_is_free() {
        let mut tracker = RenderFlagsTracker::new();
        let flags = RenderFlags {
            blend_mode: BlendMode::Subtract,
            blend_src: BlendFactor::SrcAlpha,
            blend_dst: BlendFactor::OneMinusSrcAlpha,
            depth_test: true,
            depth_func: CompareMode::LessEqual,
            depth_write: false,
            cull_mode: CullMode::Front,
            front_face: FrontFaceMode::Cw,
        };
        let first = transition(&mut tracker, &flags);
        assert_eq!(first.len(), MAX_FLAG_COMMANDS);
        assert!(transition(&mut tracker, &flags).is_empty());
        assert_eq!(tracker.current(), &flags);
    }

    #[test]
    fn default_flags_match_a_fresh_context() {
        let mut tracker = RenderFlagsTracker::new();
        assert!(transition(&mut tracker, &RenderFlags::default()).is_empty());
    }

    #[test]
    fn each_field_is_diffed_alone() {
        let base = RenderFlags::default();
        let cases: Vec<(RenderFlags, Vec<Command<Record>>)> = vec![
            (
                RenderFlags {
                    depth_write: false,
                    ..base
                },
                vec![Command::DepthMask(false)],
            ),
            (
                RenderFlags {
                    depth_test: true,
                    ..base
                },
                vec![Command::Enable(glow::DEPTH_TEST)],
            ),
            (
                RenderFlags {
                    depth_func: CompareMode::Always,
                    ..base
                },
                vec![Command::DepthFunc(glow::ALWAYS)],
            ),
            (
                RenderFlags {
                    blend_src: BlendFactor::DstColor,
                    ..base
                },
                vec![Command::BlendFunc {
                    src: glow::DST_COLOR,
                    dst: glow::ZERO,
                }],
            ),
            (
                RenderFlags {
                    blend_dst: BlendFactor::One,
                    ..base
                },
                vec![Command::BlendFunc {
                    src: glow::ONE,
                    dst: glow::ONE,
                }],
            ),
            (
                RenderFlags {
                    blend_mode: BlendMode::ReverseSubtract,
                    ..base
                },
                vec![
                    Command::Enable(glow::BLEND),
                    Command::BlendEquation(glow::FUNC_REVERSE_SUBTRACT),
                ],
            ),
            (
                RenderFlags {
                    cull_mode: CullMode::FrontAndBack,
                    ..base
                },
                vec![
                    Command::Enable(glow::CULL_FACE),
                    Command::CullFace(glow::FRONT_AND_BACK),
                ],
            ),
            (
                RenderFlags {
                    front_face: FrontFaceMode::Cw,
                    ..base
                },
                vec![Command::FrontFace(glow::CW)],
            ),
        ];
        for (flags, expected) in cases {
            let mut tracker = RenderFlagsTracker::new();
            assert_eq!(transition(&mut tracker, &flags), expected, "{:?}", flags);
        }
    }

    #[test]
    fn blend_and_cull_toggle_their_capability_once() {
        let mut tracker = RenderFlagsTracker::new();
        let add = RenderFlags {
            blend_mode: BlendMode::Add,
            cull_mode: CullMode::Back,
            ..RenderFlags::default()
        };
        // FUNC_ADD and BACK are what a fresh context holds
        assert_eq!(
            transition(&mut tracker, &add),
            vec![Command::Enable(glow::BLEND), Command::Enable(glow::CULL_FACE)]
        );

        let subtract = RenderFlags {
            blend_mode: BlendMode::Subtract,
            cull_mode: CullMode::Front,
            ..add
        };
        assert_eq!(
            transition(&mut tracker, &subtract),
            vec![
                Command::BlendEquation(glow::FUNC_SUBTRACT),
                Command::CullFace(glow::FRONT),
            ]
        );

        assert_eq!(
            transition(&mut tracker, &RenderFlags::default()),
            vec![Command::Disable(glow::BLEND), Command::Disable(glow::CULL_FACE)]
        );

        // disabled capabilities keep their equation and face
        assert_eq!(
            transition(&mut tracker, &subtract),
            vec![Command::Enable(glow::BLEND), Command::Enable(glow::CULL_FACE)]
        );
        assert_eq!(
            transition(&mut tracker, &add),
            vec![
                Command::BlendEquation(glow::FUNC_ADD),
                Command::CullFace(glow::BACK),
            ]
        );
    }

    #[test]
    fn forced_culling_off_is_remembered() {
        let mut tracker = RenderFlagsTracker::new();
        let culled = RenderFlags {
            cull_mode: CullMode::Back,
            ..RenderFlags::default()
        };
        transition(&mut tracker, &culled);

        let commands: Vec<Command<Record>> = tracker
            .transition(
                &culled,
                ApplyFlagsOptions {
                    force_disable_culling: true,
                },
            )
            .into_iter()
            .collect();
        assert_eq!(commands, vec![Command::Disable(glow::CULL_FACE)]);
        assert_eq!(tracker.current().cull_mode, CullMode::None);

        // the next regular apply has to turn culling back on
        assert_eq!(
            transition(&mut tracker, &culled),
            vec![Command::Enable(glow::CULL_FACE)]
        );
    }
}
