// src/services/menu.rs
//! Menu principal: links fixos + páginas dinâmicas.

use crate::models::page::Page;

/// Link fixo depois do qual entram os grupos (dropdowns).
pub const GROUP_ANCHOR: &str = "Estudos Bíblicos";
/// Link fixo antes do qual entram as páginas soltas.
pub const STANDALONE_ANCHOR: &str = "Sobre";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: String,
    // Vazio nos grupos (que só abrem o submenu)
    pub path: String,
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    pub fn link(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            children: Vec::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Marca o link da página atual (ou o grupo que o contém).
    pub fn is_active(&self, current: &str) -> bool {
        (!self.path.is_empty() && self.path == current)
            || self.children.iter().any(|c| c.is_active(current))
    }
}

pub fn static_links() -> Vec<MenuEntry> {
    vec![
        MenuEntry::link("Início", "/"),
        MenuEntry::link("Cultos", "/cultos"),
        MenuEntry::link(GROUP_ANCHOR, "/estudos"),
        MenuEntry::link(STANDALONE_ANCHOR, "/sobre"),
        MenuEntry::link("Contato", "/contato"),
    ]
}

/// Junta as páginas dinâmicas aos links fixos.
///
/// Páginas com menu pai formam um dropdown por rótulo, inseridos logo depois de
/// "Estudos Bíblicos" pela ordem em que o rótulo aparece pela primeira vez.
/// Páginas sem menu pai entram antes de "Sobre" (ou no fim, se não houver "Sobre").
/// `pages` já vem filtrada (publicadas e visíveis no menu) e ordenada.
pub fn compose_menu(static_links: Vec<MenuEntry>, pages: &[Page]) -> Vec<MenuEntry> {
    let mut groups: Vec<MenuEntry> = Vec::new();
    let mut standalone: Vec<MenuEntry> = Vec::new();
    for page in pages {
        let entry = MenuEntry::link(&page.title, &page.path());
        match page.menu_group() {
            Some(label) => match groups.iter_mut().find(|g| g.name == label) {
                Some(group) => group.children.push(entry),
                None => groups.push(MenuEntry {
                    name: label.to_string(),
                    path: String::new(),
                    children: vec![entry],
                }),
            },
            None => standalone.push(entry),
        }
    }

    let mut menu = static_links;
    if !groups.is_empty() {
        let at = menu
            .iter()
            .position(|e| e.name == GROUP_ANCHOR)
            .map(|i| i + 1)
            .unwrap_or(menu.len());
        menu.splice(at..at, groups);
    }
    if !standalone.is_empty() {
        let at = menu
            .iter()
            .position(|e| e.name == STANDALONE_ANCHOR)
            .unwrap_or(menu.len());
        menu.splice(at..at, standalone);
    }
    menu
}
