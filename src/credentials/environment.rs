use super::{ResolvedCredential, SourceKind};
use crate::env::Env;

const ACCESS_KEY_VARS: [&str; 2] = ["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY"];
const SECRET_KEY_VARS: [&str; 2] = ["AWS_SECRET_ACCESS_KEY", "AWS_SECRET_KEY"];
const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// Reads the conventional AWS credential variables. Both key and secret must be set.
pub(super) fn resolve(env: &Env) -> Option<ResolvedCredential> {
    let access_key = env.first_of(&ACCESS_KEY_VARS)?;
    let secret_key = env.first_of(&SECRET_KEY_VARS)?;

    Some(ResolvedCredential::new(
        access_key,
        secret_key,
        env.get(SESSION_TOKEN_VAR),
        None,
        SourceKind::Environment,
    ))
}
