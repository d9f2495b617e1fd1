use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$").unwrap()
});

const EMAIL_MAX: usize = 254;
const JWT_SECRET_MIN: usize = 12;
const JWT_SECRET_MAX: usize = 1024;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email) && email.len() <= EMAIL_MAX
}

pub fn is_valid_jwt_secret(secret: &str) -> bool {
    (JWT_SECRET_MIN..=JWT_SECRET_MAX).contains(&secret.len())
}

pub fn is_valid_url(url: &str) -> bool {
    url::Url::parse(url).is_ok()
}
