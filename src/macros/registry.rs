//! Macro registry for storage, lookup and dispatch of macro definitions.
//!
//! # Features
//! - Register and look up macro definitions by name (case-sensitive).
//! - Overwriting an existing definition is silent unless using `register_or_error`.
//! - `dispatch` runs one raw block through extraction, schema validation and
//!   the semantic parser of its definition.
//!
//! # Summary Table
//! | Method             | Overwrites | Error on Duplicate | Notes                        |
//! |--------------------|------------|--------------------|------------------------------|
//! | register           | Yes        | No                 | Returns the replaced entry   |
//! | register_or_error  | No         | Yes                | Fails with [`DuplicateMacro`] |
//! | lookup/contains    | N/A        | N/A                | Case-sensitive lookup        |
//! | dispatch           | N/A        | N/A                | Unknown names fail           |
//!
//! # Example
//! ```rust
//! use coursemark::macros::MacroRegistry;
//! let registry = MacroRegistry::standard();
//! assert!(registry.contains("code-task"));
//! assert!(!registry.contains("group"));
//! ```

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::ast::MacroNode;
use crate::errors::ParseError;
use crate::macros::builtin::register_builtin_macros;
use crate::macros::validation::{validate_inline, validate_params};
use crate::macros::{MacroDefinition, ParseContext, ValidatedMacro};
use crate::syntax::inline::extract;
use crate::syntax::params::parse_params;
use crate::syntax::splitter::RawMacroBlock;

static DEFAULT_REGISTRY: Lazy<MacroRegistry> = Lazy::new(MacroRegistry::standard);

/// The registry holding every built-in macro, built once.
pub fn default_registry() -> &'static MacroRegistry {
    &DEFAULT_REGISTRY
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Macro '{name}' is already registered")]
pub struct DuplicateMacro {
    pub name: String,
}

/// Macro definitions by name.
///
/// Not thread-safe for mutation; the shared [`default_registry`] is read-only.
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    macros: HashMap<String, MacroDefinition>,
}

impl MacroRegistry {
    /// Creates a new, empty macro registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in macro registered.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_builtin_macros(&mut registry);
        registry
    }

    /// Registers a definition under its own name.
    ///
    /// # Returns
    /// `Some(old)` if a definition with this name was already registered.
    pub fn register(&mut self, definition: MacroDefinition) -> Option<MacroDefinition> {
        self.macros.insert(definition.name.to_string(), definition)
    }

    /// Registers a definition, refusing to replace an existing one.
    ///
    /// # Errors
    /// Returns [`DuplicateMacro`] if the name is taken.
    pub fn register_or_error(&mut self, definition: MacroDefinition) -> Result<(), DuplicateMacro> {
        if self.macros.contains_key(definition.name) {
            return Err(DuplicateMacro {
                name: definition.name.to_string(),
            });
        }
        self.register(definition);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validates `block` against its definition and runs the semantic parser.
    ///
    /// # Errors
    /// - `UnknownMacro` when no definition has the block's name.
    /// - Any extraction, schema or semantic failure of the macro.
    pub fn dispatch(
        &self,
        block: &RawMacroBlock,
        ctx: &ParseContext<'_>,
    ) -> Result<MacroNode, ParseError> {
        let definition = self
            .lookup(&block.name)
            .ok_or_else(|| ParseError::UnknownMacro {
                name: block.name.clone(),
            })?;
        debug!("dispatching #{}", block.name);

        let extracted = extract(&block.name, block.content.as_deref().unwrap_or(""))?;
        let inline = extracted.inline_map(&block.name)?;
        validate_inline(definition, &inline)?;
        let raw_params = block.params.as_deref().map(parse_params).unwrap_or_default();
        let params = validate_params(definition, raw_params)?;

        let validated = ValidatedMacro {
            name: block.name.clone(),
            content: extracted.main,
            inline,
            params,
        };
        (definition.parser)(&validated, ctx)
    }
}
