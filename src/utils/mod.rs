pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{OptimizerError, OptimizerResult, PathError, ValidationError};
pub use validation::{validate_input_path, validate_options, validate_settings};
pub use formats::{ImageFormat, png_compression_level};
pub use fs::{
    file_size,
    get_file_size,
    get_extension,
    create_temp_output,
    keep_temp,
    replace_with_temp,
};
