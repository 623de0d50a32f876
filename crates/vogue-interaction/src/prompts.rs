//! Instructions sent to the AI service alongside the images.
//!
//! The instructions are English; the describe prompts ask for answers in
//! Traditional Chinese (Taiwan) so the critique matches the UI language.

use minijinja::{Environment, context};

pub const STYLE_CRITIQUE_INSTRUCTION: &str = r#"Please act as a world-class high-fashion stylist. Analyze the outfit in this image.
1. Identify the key pieces and the current style.
2. Give a critique on color coordination and fit.
3. Suggest 3 specific improvements or items that would elevate this look.

Format the output in clear Markdown with headers. Keep the tone chic, encouraging, and professional.
Respond in Traditional Chinese (Taiwan)."#;

pub const MATCH_CRITIQUE_INSTRUCTION: &str = r#"I have two images: Image 1 is a person, Image 2 is a clothing item.
Act as a stylist.
1. Analyze if the clothing item in Image 2 matches the style, body type, and vibe of the person in Image 1.
2. Provide styling advice on how to wear this specific item (e.g., tuck it in, layer it, accessories).
3. Rate the compatibility out of 10.

Respond in Traditional Chinese (Taiwan). Keep it concise and helpful."#;

pub const ITEM_TRY_ON_INSTRUCTION: &str = r#"Create a photorealistic image of the person from the first image wearing the clothing item shown in the second image.
- Replace the person's current relevant clothing (e.g., if the item is a top, replace the top; if it's a dress, replace the outfit) with the item in the second image.
- Ensure the fit looks natural on the person's body type.
- PRESERVE the person's face, hair, pose, and the original background from the first image exactly.
- High quality, fashion photography style."#;

const TEXT_TRY_ON_TEMPLATE: &str = "Change the clothing of the person in the image to match this description: {{ description }}. Keep the face, body pose, and background exactly the same. Make it look photorealistic.";

/// Renders the text try-on instruction for a free-text style description.
pub fn text_try_on_instruction(description: &str) -> Result<String, minijinja::Error> {
    let env = Environment::new();
    env.render_str(
        TEXT_TRY_ON_TEMPLATE,
        context! { description },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_instruction_embeds_description_verbatim() {
        let rendered = text_try_on_instruction("red evening gown & <heels>").unwrap();
        assert!(rendered.starts_with(
            "Change the clothing of the person in the image to match this description: red evening gown & <heels>."
        ));
        assert!(rendered.ends_with("Make it look photorealistic."));
    }

    #[test]
    fn test_describe_prompts_request_traditional_chinese() {
        assert!(STYLE_CRITIQUE_INSTRUCTION.contains("Traditional Chinese (Taiwan)"));
        assert!(MATCH_CRITIQUE_INSTRUCTION.contains("out of 10"));
    }
}
