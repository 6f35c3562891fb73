//! Interactive terminal chat for ChatFlow.
//!
//! The terminal is just another [`ChatView`](chatflow_core::conversation::presenter::ChatView):
//! the presentation loop drives it exactly as it would drive a web widget.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
pub mod view;
