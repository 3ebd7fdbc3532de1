mod data_url;
mod ffprobe_info;
mod format;
mod path_validator;
mod sprite_sheet_generator;
mod video_scanner;

pub use data_url::{PNG_DATA_URL_PREFIX, decode_data_url, encode_png_data_url};
pub use ffprobe_info::{FfprobeMediaProbe, parse_ffprobe_json};
pub use format::{format_file_size, timecode_from_seconds};
pub use path_validator::{ensure_directory_exists, validate_directory_exists, validate_file_exists};
pub use sprite_sheet_generator::FfmpegSpriteSheetRequester;
pub use video_scanner::{VideoFileInfo, scan_video_files};
