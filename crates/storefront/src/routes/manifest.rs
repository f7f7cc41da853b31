//! Web app manifest route handler.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use mais_saude_core::StoreSettings;

use crate::error::Result;
use crate::state::AppState;

/// Build the manifest from the store settings.
fn manifest(settings: &StoreSettings) -> Value {
    let short_name: String = settings.store_name.chars().take(12).collect();

    json!({
        "name": settings.store_name,
        "short_name": short_name,
        "description": settings.store_description,
        "lang": "pt-BR",
        "start_url": "/",
        "scope": "/",
        "display": "standalone",
        "theme_color": settings.primary_color,
        "background_color": "#ffffff",
        "icons": [
            {
                "src": "/static/icons/icon-192.png",
                "sizes": "192x192",
                "type": "image/png"
            },
            {
                "src": "/static/icons/icon-512.png",
                "sizes": "512x512",
                "type": "image/png",
                "purpose": "any maskable"
            }
        ]
    })
}

/// Serve the web app manifest.
pub async fn webmanifest(State(state): State<AppState>) -> Result<Response> {
    let settings = state.cache().store_settings(state.pool()).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/manifest+json")],
        manifest(&settings).to_string(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_uses_settings() {
        let settings = StoreSettings {
            store_name: "Farmácia Mais Saúde".to_owned(),
            primary_color: "#0f766e".to_owned(),
            ..StoreSettings::default()
        };
        let m = manifest(&settings);
        assert_eq!(m["name"], "Farmácia Mais Saúde");
        assert_eq!(m["short_name"], "Farmácia Mai");
        assert_eq!(m["theme_color"], "#0f766e");
        assert_eq!(m["display"], "standalone");
    }
}
