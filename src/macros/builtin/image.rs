//! `#image("path.png")[optional caption]`.

use log::warn;

use crate::ast::{ImageNode, ImageSize, MacroNode};
use crate::errors::ParseError;
use crate::macros::{MacroDefinition, ParseContext, ValidatedMacro};
use crate::syntax::params::ParamValue;

pub fn image() -> MacroDefinition {
    MacroDefinition::new("image", parse_image).param("source", ParamValue::Text(String::new()))
}

fn parse_image(validated: &ValidatedMacro, ctx: &ParseContext<'_>) -> Result<MacroNode, ParseError> {
    let reference = validated.text_param("source").trim();
    if reference.is_empty() {
        return Err(ParseError::MissingParam {
            macro_name: validated.name.clone(),
            key: "source".into(),
        });
    }
    let unavailable = |reason: String| ParseError::ImageUnavailable {
        reference: reference.to_string(),
        reason,
    };

    let resolved = ctx
        .assets
        .resolve(reference, ctx.source_path)
        .map_err(|e| unavailable(e.to_string()))?;
    let dimensions = match ctx.assets.read(&resolved) {
        Ok(bytes) => ctx.assets.measure(&bytes),
        Err(e) => {
            warn!("could not measure image '{}': {}", reference, e);
            Default::default()
        }
    };

    let caption = validated
        .content
        .as_deref()
        .map(str::trim)
        .filter(|caption| !caption.is_empty())
        .map(|caption| ctx.markdown(caption));

    Ok(MacroNode::Image(ImageNode {
        src: resolved.public_url,
        width: dimensions.width.unwrap_or(0),
        height: dimensions.height.unwrap_or(0),
        size: ImageSize::L,
        caption,
    }))
}
