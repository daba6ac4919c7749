// src/models/site_config.rs
use serde::{Deserialize, Serialize};

/// Linha da tabela `church_info` (chave/valor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRow {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// Secção do formulário de configurações onde o campo aparece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    General,
    Hero,
    About,
    Contact,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::General,
        ConfigSection::Hero,
        ConfigSection::About,
        ConfigSection::Contact,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ConfigSection::General => "Informações Gerais",
            ConfigSection::Hero => "Página Inicial",
            ConfigSection::About => "Página Sobre",
            ConfigSection::Contact => "Página de Contato",
        }
    }
}

/// Um campo da configuração pronto para o formulário.
#[derive(Debug, Clone)]
pub struct ConfigField {
    pub key: &'static str,
    pub label: &'static str,
    pub section: ConfigSection,
    pub multiline: bool,
    pub value: String,
}

// Gera a struct tipada, os valores por omissão e o mapeamento chave -> campo
// a partir de uma única tabela.
macro_rules! site_config {
    ($( $field:ident : $section:ident, $multiline:expr, $label:expr, $default:expr; )*) => {
        /// Configuração do site com todos os campos sempre presentes.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct SiteConfig {
            $( pub $field: String, )*
        }

        impl Default for SiteConfig {
            fn default() -> Self {
                Self {
                    $( $field: $default.to_string(), )*
                }
            }
        }

        impl SiteConfig {
            pub const KEYS: &'static [&'static str] = &[ $( stringify!($field), )* ];

            /// Aplica um valor vindo da base. Devolve `false` para chaves desconhecidas.
            pub fn apply(&mut self, key: &str, value: String) -> bool {
                match key {
                    $( stringify!($field) => { self.$field = value; true } )*
                    _ => false,
                }
            }

            pub fn get(&self, key: &str) -> Option<&str> {
                match key {
                    $( stringify!($field) => Some(self.$field.as_str()), )*
                    _ => None,
                }
            }

            pub fn fields(&self) -> Vec<ConfigField> {
                vec![
                    $( ConfigField {
                        key: stringify!($field),
                        label: $label,
                        section: ConfigSection::$section,
                        multiline: $multiline,
                        value: self.$field.clone(),
                    }, )*
                ]
            }
        }
    };
}

site_config! {
    church_name: General, false, "Nome da igreja", "Tabernáculo";
    church_subtitle: General, false, "Subtítulo", "O Filho do Homem";
    description: General, true, "Descrição", "Uma comunidade de fé dedicada a proclamar a mensagem de Cristo e servir ao próximo com amor.";
    address_line1: General, false, "Endereço (linha 1)", "Rua Exemplo, 123";
    address_line2: General, false, "Endereço (linha 2)", "Centro - Cidade/UF";
    phone: General, false, "Telefone", "(00) 00000-0000";
    email: General, false, "E-mail", "contato@tabernaculo.com";
    facebook_url: General, false, "Facebook", "";
    instagram_url: General, false, "Instagram", "";
    youtube_url: General, false, "YouTube", "";
    hero_welcome_text: Hero, false, "Texto de boas-vindas", "Bem-vindo ao";
    hero_title: Hero, false, "Título", "Tabernáculo";
    hero_subtitle: Hero, false, "Subtítulo", "O Filho do Homem";
    hero_verse: Hero, true, "Versículo", "Porque o Filho do Homem veio buscar e salvar o que se havia perdido.";
    hero_verse_reference: Hero, false, "Referência do versículo", "Lucas 19:10";
    hero_image_url: Hero, false, "Imagem de fundo (URL)", "";
    about_history: About, true, "Nossa história", "";
    about_mission: About, true, "Missão", "";
    about_vision: About, true, "Visão", "";
    about_value_1_title: About, false, "Valor 1 - título", "Fidelidade à Palavra";
    about_value_1_description: About, true, "Valor 1 - descrição", "";
    about_value_2_title: About, false, "Valor 2 - título", "Amor ao Próximo";
    about_value_2_description: About, true, "Valor 2 - descrição", "";
    about_value_3_title: About, false, "Valor 3 - título", "Compromisso com a Verdade";
    about_value_3_description: About, true, "Valor 3 - descrição", "";
    about_value_4_title: About, false, "Valor 4 - título", "Adoração Reverente";
    about_value_4_description: About, true, "Valor 4 - descrição", "";
    contact_address: Contact, true, "Endereço", "";
    contact_phone: Contact, false, "Telefone", "";
    contact_email: Contact, false, "E-mail", "";
    contact_schedule: Contact, true, "Horário de atendimento", "";
    contact_whatsapp: Contact, false, "WhatsApp", "";
    contact_facebook_url: Contact, false, "Facebook", "";
    contact_instagram_url: Contact, false, "Instagram", "";
    contact_youtube_url: Contact, false, "YouTube", "";
    contact_map_embed_url: Contact, false, "Mapa (URL de incorporação)", "";
}

impl SiteConfig {
    /// Preenche a configuração a partir das linhas da base, por cima dos valores por omissão.
    /// Chaves desconhecidas são ignoradas e devolvidas para registo.
    pub fn from_rows(rows: Vec<ConfigRow>) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut unknown = Vec::new();
        for row in rows {
            let value = row.value.unwrap_or_default();
            if !config.apply(&row.key, value) {
                unknown.push(row.key);
            }
        }
        (config, unknown)
    }

    /// Todas as chaves como linhas, para gravação em lote.
    pub fn to_rows(&self) -> Vec<ConfigRow> {
        self.fields()
            .into_iter()
            .map(|f| ConfigRow {
                key: f.key.to_string(),
                value: Some(f.value),
            })
            .collect()
    }

    pub fn fields_in(&self, section: ConfigSection) -> Vec<ConfigField> {
        self.fields()
            .into_iter()
            .filter(|f| f.section == section)
            .collect()
    }

    /// Valores do "Sobre" agrupados (título, descrição).
    pub fn about_values(&self) -> Vec<(String, String)> {
        vec![
            (self.about_value_1_title.clone(), self.about_value_1_description.clone()),
            (self.about_value_2_title.clone(), self.about_value_2_description.clone()),
            (self.about_value_3_title.clone(), self.about_value_3_description.clone()),
            (self.about_value_4_title.clone(), self.about_value_4_description.clone()),
        ]
    }
}
