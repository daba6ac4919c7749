// src/web/flash.rs
//! Notificações de uma só leitura, guardadas num cookie assinado até à página seguinte.

use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies, Key};

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Classe CSS do aviso.
    pub fn css(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

/// Guarda a notificação para o próximo pedido.
pub fn push(cookies: &Cookies, key: &Key, flash: Flash) {
    let json = match serde_json::to_string(&flash) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Falha ao serializar notificação: {}", e);
            return;
        }
    };
    let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(&json).into_owned()))
        .path("/")
        .http_only(true)
        .build();
    cookies.signed(key).add(cookie);
}

/// Lê e apaga a notificação pendente. Assinatura inválida conta como ausente.
pub fn take(cookies: &Cookies, key: &Key) -> Option<Flash> {
    let signed = cookies.signed(key);
    let cookie = signed.get(FLASH_COOKIE)?;
    signed.remove(Cookie::build(FLASH_COOKIE).path("/").build());

    let json = urlencoding::decode(cookie.value()).ok()?;
    match serde_json::from_str(&json) {
        Ok(flash) => Some(flash),
        Err(e) => {
            tracing::warn!("Notificação ilegível descartada: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_serialises_kind_in_lowercase() {
        let json = serde_json::to_string(&Flash::error("Falhou; tente de novo")).unwrap();
        assert_eq!(json, r#"{"kind":"error","message":"Falhou; tente de novo"}"#);
        assert_eq!(Flash::success("ok").css(), "success");
    }

    #[test]
    fn pushed_flash_is_read_once() {
        let cookies = Cookies::default();
        let key = Key::from(&[3u8; 64]);
        push(&cookies, &key, Flash::success("Culto criado com sucesso!"));
        assert_eq!(take(&cookies, &key), Some(Flash::success("Culto criado com sucesso!")));
        assert_eq!(take(&cookies, &key), None);
    }

    #[test]
    fn flash_signed_with_another_key_is_ignored() {
        let cookies = Cookies::default();
        push(&cookies, &Key::from(&[3u8; 64]), Flash::success("x"));
        assert_eq!(take(&cookies, &Key::from(&[4u8; 64])), None);
    }
}
