//! Fixed prompt template for the extraction call.

/// Build the extraction prompt for one email body.
///
/// The template is part of the wire contract: the model must answer with
/// strict JSON carrying `title`, `code`, `topic` and `codeExist` set to 1
/// when a code, link, or password is present, or `{"codeExist": 0}`
/// otherwise. When both a code and a link are present they are concatenated
/// into `code` as `"code, link"`.
#[must_use]
pub fn extraction_prompt(raw_email: &str) -> String {
    format!(
        r#"
  Email content: {raw_email}.

  Please read the email and extract the following information:
  1. Code/Link/Password from the email (if available).
  2. Organization name (title) from which the email is sent.
  3. A brief summary of the email's topic (e.g., 'line register verification').

  Format the output as JSON with this structure:
  {{
    "title": "The organization or company that sent the verification code (e.g., 'Netflix')",
    "code": "The extracted verification code, link, or password (e.g., '123456' or 'https://example.com/verify?code=123456')",
    "topic": "A brief summary of the email's topic (e.g., 'line register verification')",
    "codeExist": 1
  }}

  If both a code and a link are present, include both in the 'code' field like this:
  "code": "code, link"

  If there is no code, clickable link, or this is an advertisement email, return:
  {{
    "codeExist": 0
  }}
"#
    )
}
