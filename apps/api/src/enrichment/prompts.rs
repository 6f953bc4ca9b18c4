// Enrichment prompt templates. Placeholders in braces are replaced before sending.

pub const INDUSTRY_PROMPT_TEMPLATE: &str =
    "What industry is {brand_name} primarily operating in? Provide a one-word answer.";

pub const SIMILAR_BRANDS_PROMPT_TEMPLATE: &str = "List 5 companies similar to {brand_name} \
    in the same industry. Provide the response as a comma-separated list.";

pub const OUTREACH_EMAIL_PROMPT_TEMPLATE: &str = r#"Create a professional outreach email with the following details:
- Sender's company information: {sender_info}
- Recipient company: {recipient_brand}
- Outreach goal: {outreach_goal}
- Desired Call to Action: {desired_cta}
The email should be concise, friendly, and tailored to the recipient company."#;
