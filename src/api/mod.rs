pub mod models;
pub mod video;

pub use video::{
    get_frame_at_timestamp, get_video_duration, resolve_video, FrameRequestError, MediaConfig,
};
