pub mod native_messaging;

pub use native_messaging::{encode_response, read_frame, serve, write_frame, Frame, FrameError};
