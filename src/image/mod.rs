pub mod dynamic;
pub mod f32;
pub mod io;
pub mod planar;
pub mod sample;
pub mod traits;

pub use self::dynamic::SampleImage;
pub use self::f32::ImageF32;
pub use self::planar::Image;
pub use self::sample::{Sample, SampleFormat};
pub use self::traits::{ImageView, Rows};
