//! Technology generation from hand-drawn example libraries.
//!
//! Each cell of a library draws one primitive (a layer, an arc, or a node)
//! one or more times at different sizes. The engine groups the shapes of a
//! cell into examples, matches the shapes of each example to the main
//! example, and infers for every shape a [`Rule`](anchor::Rule) that places
//! it in a primitive of any size.
//!
//! ```
//! use techgen::{convert, ConvertConfig, LibraryDesc};
//!
//! let lib: LibraryDesc = toml::from_str(
//!     r#"
//! [[cell]]
//! name = "layer-metal"
//!
//! [[cell.shape]]
//! kind = "text"
//! role = { layer = "function" }
//! value = "metal-1"
//! "#,
//! )
//! .unwrap();
//! let conversion = convert(&lib, ConvertConfig::default());
//! assert!(!conversion.has_error());
//! assert_eq!(conversion.technology.layers[0].name, "metal");
//! ```

pub mod anchor;
pub mod assemble;
pub mod associate;
pub mod cluster;
pub mod config;
pub mod context;
pub mod error;
pub mod id;
pub mod infer;
pub mod input;
pub mod model;
pub mod multicut;
pub mod role;
pub mod synth;
pub mod tech;

#[cfg(test)]
mod tests;

pub use assemble::{Conversion, Converter};
pub use config::ConvertConfig;
pub use error::{ConvError, ConvWarning, Issue};
pub use input::LibraryDesc;
pub use tech::Technology;

/// Converts every cell of `lib` into a technology.
///
/// Failed cells are reported in [`Conversion::issues`] and left out of the
/// technology; the remaining cells still convert.
pub fn convert(lib: &LibraryDesc, config: ConvertConfig) -> Conversion {
    Converter::new(lib, config).run()
}
