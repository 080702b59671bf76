//! Integration tests: full trading sessions against an in-memory arena.

mod mock_arena;
mod session_flow;
