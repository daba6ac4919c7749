// src/templates.rs
use askama::Template; // Trait necessário para Askama
use crate::{
    models::{
        culto::{Culto, CultoForm},
        estudo::{Estudo, EstudoForm},
        page::{Page, PageForm},
        photo::AnniversaryPhoto,
        schedule::{ScheduleForm, ScheduleItem},
        site_config::{ConfigField, SiteConfig},
    },
    services::{content, editor, menu::MenuEntry},
    web::flash::Flash,
};

// --- Dados partilhados pelas páginas ---

/// Item de navegação já resolvido para a página atual.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub name: String,
    pub path: String,
    pub active: bool,
    pub children: Vec<NavItem>,
}

impl NavItem {
    pub fn from_menu(menu: &[MenuEntry], current: &str) -> Vec<NavItem> {
        menu.iter()
            .map(|entry| NavItem {
                name: entry.name.clone(),
                path: entry.path.clone(),
                active: entry.is_active(current),
                children: NavItem::from_menu(&entry.children, current),
            })
            .collect()
    }
}

/// Cabeçalho, rodapé e notificação de todas as páginas públicas.
pub struct SiteChrome {
    pub config: SiteConfig,
    pub nav: Vec<NavItem>,
    pub flash: Option<Flash>,
}

const ADMIN_LINKS: &[(&str, &str)] = &[
    ("Painel", "/admin"),
    ("Cultos", "/admin/cultos"),
    ("Estudos", "/admin/estudos"),
    ("Páginas", "/admin/paginas"),
    ("Fotos", "/admin/fotos"),
    ("Agenda", "/admin/agenda"),
    ("Configurações", "/admin/configuracoes"),
];

/// Barra lateral do admin.
pub struct AdminChrome {
    pub email: String,
    pub nav: Vec<NavItem>,
    pub flash: Option<Flash>,
}

impl AdminChrome {
    pub fn new(email: &str, section: &str, flash: Option<Flash>) -> Self {
        let nav = ADMIN_LINKS
            .iter()
            .map(|(name, path)| NavItem {
                name: name.to_string(),
                path: path.to_string(),
                active: *path == section,
                children: Vec::new(),
            })
            .collect();
        Self {
            email: email.to_string(),
            nav,
            flash,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

/// Opções da barra de ferramentas do editor.
pub struct EditorToolbar {
    pub fonts: Vec<Choice>,
    pub sizes: Vec<Choice>,
    pub colors: Vec<Choice>,
    pub alignments: Vec<Choice>,
}

impl EditorToolbar {
    pub fn new() -> Self {
        let choices = |items: &[(&str, &str)]| {
            items
                .iter()
                .map(|(label, value)| Choice {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect::<Vec<Choice>>()
        };
        let align_labels = ["Esquerda", "Centro", "Direita", "Justificado"];
        Self {
            fonts: choices(editor::FONTS),
            sizes: choices(editor::SIZES),
            colors: choices(editor::COLORS),
            alignments: editor::ALIGNMENTS
                .iter()
                .zip(align_labels)
                .map(|(value, label)| Choice {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }
}

impl Default for EditorToolbar {
    fn default() -> Self {
        Self::new()
    }
}

// --- Modelos de apresentação ---

#[derive(Debug, Clone)]
pub struct CultoCard {
    pub id: String,
    pub title: String,
    pub date_label: String,
    pub date_short: String,
    pub preacher: String,
    pub summary: String,
    pub thumbnail: String,
    pub published: bool,
}

impl From<&Culto> for CultoCard {
    fn from(culto: &Culto) -> Self {
        // Sem miniatura própria usa a do vídeo
        let thumbnail = culto.thumbnail_url.clone().unwrap_or_else(|| {
            culto
                .video_id
                .as_ref()
                .map(|id| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
                .unwrap_or_default()
        });
        Self {
            id: culto.id.clone(),
            title: culto.title.clone(),
            date_label: content::format_date_pt(culto.date),
            date_short: content::format_date_short(culto.date),
            preacher: culto.preacher.clone().unwrap_or_default(),
            summary: culto.summary.clone().unwrap_or_default(),
            thumbnail,
            published: culto.published,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EstudoCard {
    pub id: String,
    pub title: String,
    pub author: String,
    pub date_label: String,
    pub date_short: String,
    pub excerpt: String,
    pub published: bool,
}

impl From<&Estudo> for EstudoCard {
    fn from(estudo: &Estudo) -> Self {
        Self {
            id: estudo.id.clone(),
            title: estudo.title.clone(),
            author: estudo.author.clone(),
            date_label: content::format_date_pt(estudo.date),
            date_short: content::format_date_short(estudo.date),
            excerpt: estudo.excerpt.clone().unwrap_or_default(),
            published: estudo.published,
        }
    }
}

pub struct QuickLink {
    pub title: &'static str,
    pub description: &'static str,
    pub href: &'static str,
}

/// Cartões de acesso rápido da página inicial.
pub fn quick_links() -> Vec<QuickLink> {
    vec![
        QuickLink {
            title: "Cultos",
            description: "Assista às mensagens e relembre os ensinamentos.",
            href: "/cultos",
        },
        QuickLink {
            title: "Estudos Bíblicos",
            description: "Aprofunde-se na Palavra com nossos estudos.",
            href: "/estudos",
        },
        QuickLink {
            title: "Ao Vivo",
            description: "Acompanhe a transmissão dos cultos.",
            href: "/ao-vivo",
        },
        QuickLink {
            title: "Contato",
            description: "Fale conosco e venha nos visitar.",
            href: "/contato",
        },
    ]
}

#[derive(Debug, Clone)]
pub struct YearTab {
    pub year: i32,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ValueCard {
    pub title: String,
    pub description: String,
}

/// Dados de contato, com os gerais como alternativa aos específicos.
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub schedule: String,
    pub whatsapp: String,
    pub facebook_url: String,
    pub instagram_url: String,
    pub youtube_url: String,
    pub map_embed_url: String,
}

impl ContactInfo {
    pub fn from_config(config: &SiteConfig) -> Self {
        let pick = |specific: &str, general: &str| {
            if specific.trim().is_empty() {
                general.to_string()
            } else {
                specific.to_string()
            }
        };
        let general_address = [config.address_line1.as_str(), config.address_line2.as_str()]
            .iter()
            .filter(|l| !l.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            address: pick(&config.contact_address, &general_address),
            phone: pick(&config.contact_phone, &config.phone),
            email: pick(&config.contact_email, &config.email),
            schedule: config.contact_schedule.clone(),
            whatsapp: config.contact_whatsapp.clone(),
            facebook_url: pick(&config.contact_facebook_url, &config.facebook_url),
            instagram_url: pick(&config.contact_instagram_url, &config.instagram_url),
            youtube_url: pick(&config.contact_youtube_url, &config.youtube_url),
            map_embed_url: config.contact_map_embed_url.clone(),
        }
    }

    /// Número só com dígitos para o link do WhatsApp.
    pub fn whatsapp_digits(&self) -> String {
        self.whatsapp.chars().filter(char::is_ascii_digit).collect()
    }
}

pub struct PhotoGroup {
    pub value: String,
    pub label: String,
    pub photos: Vec<AnniversaryPhoto>,
}

#[derive(Debug, Clone)]
pub struct PhotoTab {
    pub value: String,
    pub label: String,
    pub count: usize,
    pub active: bool,
}

pub struct PageGroup {
    pub label: String,
    pub pages: Vec<Page>,
}

pub struct ConfigSectionView {
    pub title: String,
    pub fields: Vec<ConfigField>,
}

// --- Páginas públicas ---

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomePage {
    pub chrome: SiteChrome,
    pub recent: Vec<CultoCard>,
    pub schedule: Vec<ScheduleItem>,
    pub quick_links: Vec<QuickLink>,
}

#[derive(Template)]
#[template(path = "cultos.html")]
pub struct CultosPage {
    pub chrome: SiteChrome,
    pub years: Vec<YearTab>,
    pub cultos: Vec<CultoCard>,
}

#[derive(Template)]
#[template(path = "culto_detail.html")]
pub struct CultoDetailPage {
    pub chrome: SiteChrome,
    pub culto: CultoCard,
    // Vazio quando o culto não tem vídeo
    pub embed_url: String,
    pub description_html: String,
    pub summary_html: String,
    pub teachings: Vec<String>,
}

#[derive(Template)]
#[template(path = "estudos.html")]
pub struct EstudosPage {
    pub chrome: SiteChrome,
    pub estudos: Vec<EstudoCard>,
}

#[derive(Template)]
#[template(path = "estudo_detail.html")]
pub struct EstudoDetailPage {
    pub chrome: SiteChrome,
    pub estudo: EstudoCard,
    pub content_html: String,
}

#[derive(Template)]
#[template(path = "sobre.html")]
pub struct SobrePage {
    pub chrome: SiteChrome,
    pub history_html: String,
    pub mission_html: String,
    pub vision_html: String,
    pub values: Vec<ValueCard>,
}

#[derive(Template)]
#[template(path = "ao_vivo.html")]
pub struct AoVivoPage {
    pub chrome: SiteChrome,
    pub embed_url: String,
}

#[derive(Template)]
#[template(path = "contato.html")]
pub struct ContatoPage {
    pub chrome: SiteChrome,
    pub contact: ContactInfo,
}

#[derive(Template)]
#[template(path = "pagina.html")]
pub struct DynamicPage {
    pub chrome: SiteChrome,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub section_title: String,
    pub section_subtitle: String,
    pub content_html: String,
}

#[derive(Template)]
#[template(path = "galeria.html")]
pub struct GaleriaPage {
    pub chrome: SiteChrome,
    pub groups: Vec<PhotoGroup>,
}

#[derive(Template)]
#[template(path = "o_inicio.html")]
pub struct OInicioPage {
    pub chrome: SiteChrome,
}

#[derive(Template)]
#[template(path = "vinte_anos.html")]
pub struct VinteAnosPage {
    pub chrome: SiteChrome,
    pub photo_count: usize,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage {
    pub chrome: SiteChrome,
    pub title: String,
    pub message: String,
    pub back_href: String,
    pub back_label: String,
}

// --- Autenticação ---

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub signup: bool,
    pub email: String,
    pub error: Option<String>,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "admin_loading.html")]
pub struct AdminLoadingPage {
    pub refresh_secs: u32,
}

#[derive(Template)]
#[template(path = "admin_denied.html")]
pub struct AccessDeniedPage {
    pub email: String,
}

// --- Administração ---

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
pub struct DashboardPage {
    pub chrome: AdminChrome,
    // "-" quando a contagem falhou
    pub cultos: String,
    pub estudos: String,
    pub paginas: String,
    pub fotos: String,
}

#[derive(Template)]
#[template(path = "admin_cultos.html")]
pub struct AdminCultosPage {
    pub chrome: AdminChrome,
    pub cultos: Vec<CultoCard>,
}

#[derive(Template)]
#[template(path = "admin_culto_form.html")]
pub struct CultoFormPage {
    pub chrome: AdminChrome,
    pub heading: String,
    pub action: String,
    pub form: CultoForm,
    pub error: Option<String>,
    pub toolbar: EditorToolbar,
}

#[derive(Template)]
#[template(path = "admin_estudos.html")]
pub struct AdminEstudosPage {
    pub chrome: AdminChrome,
    pub estudos: Vec<EstudoCard>,
}

#[derive(Template)]
#[template(path = "admin_estudo_form.html")]
pub struct EstudoFormPage {
    pub chrome: AdminChrome,
    pub heading: String,
    pub action: String,
    pub form: EstudoForm,
    pub error: Option<String>,
    pub toolbar: EditorToolbar,
}

#[derive(Template)]
#[template(path = "admin_agenda.html")]
pub struct AdminAgendaPage {
    pub chrome: AdminChrome,
    pub items: Vec<ScheduleItem>,
}

#[derive(Template)]
#[template(path = "admin_agenda_form.html")]
pub struct AgendaFormPage {
    pub chrome: AdminChrome,
    pub heading: String,
    pub action: String,
    pub form: ScheduleForm,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin_paginas.html")]
pub struct AdminPaginasPage {
    pub chrome: AdminChrome,
    pub groups: Vec<PageGroup>,
}

#[derive(Template)]
#[template(path = "admin_pagina_form.html")]
pub struct PaginaFormPage {
    pub chrome: AdminChrome,
    pub heading: String,
    pub action: String,
    pub form: PageForm,
    pub error: Option<String>,
    pub toolbar: EditorToolbar,
}

#[derive(Template)]
#[template(path = "admin_fotos.html")]
pub struct AdminFotosPage {
    pub chrome: AdminChrome,
    pub tabs: Vec<PhotoTab>,
    pub category: String,
    pub category_label: String,
    pub photos: Vec<AnniversaryPhoto>,
}

#[derive(Template)]
#[template(path = "admin_config.html")]
pub struct AdminConfigPage {
    pub chrome: AdminChrome,
    pub sections: Vec<ConfigSectionView>,
    pub hero_image_url: String,
    pub error: Option<String>,
}

/// Confirmação genérica antes de apagar.
#[derive(Template)]
#[template(path = "admin_confirm.html")]
pub struct ConfirmDeletePage {
    pub chrome: AdminChrome,
    pub heading: String,
    pub message: String,
    pub action: String,
    pub cancel: String,
}
