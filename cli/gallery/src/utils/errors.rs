use gallery_rust_sdk::models::location::HistoryError;
use gallery_rust_sdk::providers::auth::AuthError;
use gallery_rust_sdk::providers::catalog::{CatalogClientError, ErrorDetail};
use indoc::formatdoc;
use itertools::Itertools;
use tracing::trace;

pub fn format_catalog_error(err: &CatalogClientError) -> String {
    trace!("formatting catalog_client_error: {err:?}");

    match err {
        CatalogClientError::Network(_) => formatdoc! {"
            {chain}

            Check your network connection and that 'api_url' points at a running catalog.
        ", chain = display_chain(err)},

        CatalogClientError::Auth { .. } => formatdoc! {"
            {err}

            Log in with 'gallery auth login' and try again.
        "},

        CatalogClientError::Validation {
            detail: ErrorDetail::Fields(fields),
            status,
        } => {
            let fields = fields
                .iter()
                .map(|field| format!("  - {field}"))
                .join("\n");
            formatdoc! {"
                The catalog rejected the request ({status}):

                {fields}
            "}
        },

        CatalogClientError::InvalidConfig(_) => formatdoc! {"
            {err}

            Check the 'api_url' and 'extra_headers' settings in your gallery.toml.
        "},

        _ => display_chain(err),
    }
}

pub fn format_auth_error(err: &AuthError) -> String {
    trace!("formatting auth_error: {err:?}");

    match err {
        AuthError::Login(CatalogClientError::Auth { detail, .. }) => formatdoc! {"
            Login failed: {detail}
        ", detail = detail.as_deref().unwrap_or("Login failed")},
        AuthError::Login(err) | AuthError::Client(err) => format_catalog_error(err),
        AuthError::UserUnavailable => formatdoc! {"
            {err}

            The login was rolled back and no token was kept, try 'gallery auth login' again.
        "},
        AuthError::Store(_) => display_chain(err),
    }
}

pub fn format_history_error(err: &HistoryError) -> String {
    match err {
        HistoryError::Corrupt(..) => formatdoc! {"
            {chain}

            Delete 'history.json' in the gallery state directory to start over.
        ", chain = display_chain(err)},
        HistoryError::StateFile(_) => display_chain(err),
    }
}

pub fn display_chain(mut err: &dyn std::error::Error) -> String {
    let mut fmt = err.to_string();
    while let Some(source) = err.source() {
        fmt = format!("{fmt}: {source}");
        err = source;
    }

    fmt
}
