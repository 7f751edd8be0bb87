//! Company settings: a singleton row created once at startup.

use crate::error::{Result, StoreError};
use crate::media::FileStore;
use crate::models::CompanySettings;
use crate::sanitize::sanitize_required;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

/// Creates the singleton row if absent. Runs once during startup so no
/// request ever races on first access.
pub async fn bootstrap(pool: &PgPool) -> Result<CompanySettings> {
    sqlx::query("INSERT INTO company_settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
        .execute(pool)
        .await?;
    get(pool).await
}

pub async fn get(pool: &PgPool) -> Result<CompanySettings> {
    sqlx::query_as::<_, CompanySettings>("SELECT * FROM company_settings WHERE id = 1")
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("settings"))
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub company_name_en: Option<String>,
    pub company_name_id: Option<String>,
    pub company_description_en: Option<String>,
    pub company_description_id: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_whatsapp: Option<String>,
    pub address_en: Option<String>,
    pub address_id: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub default_currency: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub copyright_text: Option<String>,
    pub layout_type: Option<String>,
    pub gallery_mode: Option<String>,
    pub selected_theme: Option<String>,
    pub custom_primary_color: Option<String>,
    pub custom_secondary_color: Option<String>,
    pub custom_accent_color: Option<String>,
    pub theme_mode: Option<String>,
}

pub async fn update(pool: &PgPool, update: SettingsUpdate) -> Result<CompanySettings> {
    if let Some(rate) = update.exchange_rate {
        if rate <= Decimal::ZERO {
            return Err(StoreError::Validation(
                "exchange_rate must be positive".into(),
            ));
        }
    }
    if let Some(code) = update.default_currency.as_deref() {
        if !matches!(code, "USD" | "IDR") {
            return Err(StoreError::Validation(
                "default_currency must be USD or IDR".into(),
            ));
        }
    }
    if let Some(mode) = update.theme_mode.as_deref() {
        if !matches!(mode, "preset" | "custom") {
            return Err(StoreError::Validation(
                "theme_mode must be preset or custom".into(),
            ));
        }
    }
    if let Some(mode) = update.gallery_mode.as_deref() {
        if !matches!(mode, "static" | "carousel") {
            return Err(StoreError::Validation(
                "gallery_mode must be static or carousel".into(),
            ));
        }
    }
    for (field, value) in [
        ("primary_color", &update.primary_color),
        ("secondary_color", &update.secondary_color),
        ("custom_primary_color", &update.custom_primary_color),
        ("custom_secondary_color", &update.custom_secondary_color),
        ("custom_accent_color", &update.custom_accent_color),
    ] {
        if let Some(color) = value.as_deref() {
            if !is_hex_color(color) {
                return Err(StoreError::Validation(format!(
                    "{field} must be a #rrggbb hex color"
                )));
            }
        }
    }

    let company_name_en = required_if_present("company_name_en", update.company_name_en)?;
    let company_name_id = required_if_present("company_name_id", update.company_name_id)?;

    let settings = sqlx::query_as::<_, CompanySettings>(
        "UPDATE company_settings SET \
            company_name_en = COALESCE($1, company_name_en), \
            company_name_id = COALESCE($2, company_name_id), \
            company_description_en = COALESCE($3, company_description_en), \
            company_description_id = COALESCE($4, company_description_id), \
            contact_email = COALESCE($5, contact_email), \
            contact_phone = COALESCE($6, contact_phone), \
            contact_whatsapp = COALESCE($7, contact_whatsapp), \
            address_en = COALESCE($8, address_en), \
            address_id = COALESCE($9, address_id), \
            exchange_rate = COALESCE($10, exchange_rate), \
            default_currency = COALESCE($11, default_currency), \
            primary_color = COALESCE($12, primary_color), \
            secondary_color = COALESCE($13, secondary_color), \
            copyright_text = COALESCE($14, copyright_text), \
            layout_type = COALESCE($15, layout_type), \
            gallery_mode = COALESCE($16, gallery_mode), \
            selected_theme = COALESCE($17, selected_theme), \
            custom_primary_color = COALESCE($18, custom_primary_color), \
            custom_secondary_color = COALESCE($19, custom_secondary_color), \
            custom_accent_color = COALESCE($20, custom_accent_color), \
            theme_mode = COALESCE($21, theme_mode), \
            updated_at = NOW() \
        WHERE id = 1 RETURNING *",
    )
    .bind(company_name_en)
    .bind(company_name_id)
    .bind(update.company_description_en)
    .bind(update.company_description_id)
    .bind(update.contact_email)
    .bind(update.contact_phone)
    .bind(update.contact_whatsapp)
    .bind(update.address_en)
    .bind(update.address_id)
    .bind(update.exchange_rate)
    .bind(update.default_currency)
    .bind(update.primary_color)
    .bind(update.secondary_color)
    .bind(update.copyright_text)
    .bind(update.layout_type)
    .bind(update.gallery_mode)
    .bind(update.selected_theme)
    .bind(update.custom_primary_color)
    .bind(update.custom_secondary_color)
    .bind(update.custom_accent_color)
    .bind(update.theme_mode)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("settings"))?;
    Ok(settings)
}

fn required_if_present(field: &'static str, value: Option<String>) -> Result<Option<String>> {
    value.map(|v| sanitize_required(field, &v)).transpose()
}

/// Replaces the stored logo, deleting the previous file.
pub async fn set_logo(
    pool: &PgPool,
    files: &FileStore,
    reference: &str,
) -> Result<CompanySettings> {
    let current = get(pool).await?;
    let updated = sqlx::query_as::<_, CompanySettings>(
        "UPDATE company_settings SET logo_url = $1, updated_at = NOW() WHERE id = 1 RETURNING *",
    )
    .bind(reference)
    .fetch_one(pool)
    .await?;
    if let Some(old) = current.logo_url.as_deref() {
        if old != reference {
            files.delete(old).await?;
        }
    }
    Ok(updated)
}

pub async fn add_gallery_image(pool: &PgPool, reference: &str) -> Result<CompanySettings> {
    let settings = get(pool).await?;
    let mut list: Vec<String> = settings.gallery().iter().map(|s| s.to_string()).collect();
    if !list.iter().any(|g| g == reference) {
        list.push(reference.to_string());
    }
    set_gallery(pool, &list).await
}

/// Removes an image from the gallery list and deletes the stored file.
pub async fn remove_gallery_image(
    pool: &PgPool,
    files: &FileStore,
    reference: &str,
) -> Result<CompanySettings> {
    let settings = get(pool).await?;
    let mut list: Vec<String> = settings.gallery().iter().map(|s| s.to_string()).collect();
    let before = list.len();
    list.retain(|g| g != reference);
    if list.len() == before {
        return Err(StoreError::NotFound("gallery image"));
    }
    let updated = set_gallery(pool, &list).await?;
    files.delete(reference).await?;
    Ok(updated)
}

async fn set_gallery(pool: &PgPool, list: &[String]) -> Result<CompanySettings> {
    let settings = sqlx::query_as::<_, CompanySettings>(
        "UPDATE company_settings SET gallery_images = $1, updated_at = NOW() WHERE id = 1 RETURNING *",
    )
    .bind(list.join(","))
    .fetch_one(pool)
    .await?;
    Ok(settings)
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_check() {
        assert!(is_hex_color("#28a745"));
        assert!(is_hex_color("#FFFFFF"));
        assert!(!is_hex_color("#28a74"));
        assert!(!is_hex_color("28a745"));
        assert!(!is_hex_color("#28a74g"));
    }
}
