//! Document categories and the portal page catalog.
//!
//! The scraper writes each portal page's documents to a folder named
//! `id_<page id>`. Finished files go to a sibling folder with the
//! [`PROCESSED_SUFFIX`] appended.

use std::path::{Path, PathBuf};

/// Suffix of the folder that receives processed files.
pub const PROCESSED_SUFFIX: &str = "-processed";

const PAGE_FOLDER_PREFIX: &str = "id_";

/// A topical grouping of documents, mapped 1:1 to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category {
    /// Folder name under the documents root.
    pub key: String,
    /// Portal page id parsed from an `id_<n>` folder name.
    pub page_id: Option<u32>,
}

impl Category {
    /// Create a category from its folder name.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let page_id = key
            .strip_prefix(PAGE_FOLDER_PREFIX)
            .and_then(|id| id.parse().ok());
        Self { key, page_id }
    }

    /// Create the category the scraper uses for a portal page.
    pub fn from_page_id(page_id: u32) -> Self {
        Self {
            key: format!("{}{}", PAGE_FOLDER_PREFIX, page_id),
            page_id: Some(page_id),
        }
    }

    /// Parse a user-supplied category: a bare page id (`8`) or a folder name (`id_8`).
    /// Returns `None` for blank input and for processed folders.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || Self::is_processed_folder(s) {
            return None;
        }
        match s.parse::<u32>() {
            Ok(page_id) => Some(Self::from_page_id(page_id)),
            Err(_) => Some(Self::new(s)),
        }
    }

    /// Catalog name for this category, when its page id is known.
    pub fn name(&self) -> Option<&'static str> {
        self.page_id.and_then(catalog_name)
    }

    pub fn pending_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.key)
    }

    pub fn processed_dir(&self, root: &Path) -> PathBuf {
        root.join(format!("{}{}", self.key, PROCESSED_SUFFIX))
    }

    /// Whether a folder name belongs to a processed area rather than a category.
    pub fn is_processed_folder(name: &str) -> bool {
        name.ends_with(PROCESSED_SUFFIX)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.key, name),
            None => f.write_str(&self.key),
        }
    }
}

/// Look up the portal name of a page id.
pub fn catalog_name(page_id: u32) -> Option<&'static str> {
    CATALOG
        .iter()
        .find(|(id, _)| *id == page_id)
        .map(|(_, name)| *name)
}

/// All known portal pages as `(page id, name)` pairs.
pub fn catalog() -> &'static [(u32, &'static str)] {
    CATALOG
}

const CATALOG: &[(u32, &str)] = &[
    (136, "Contratações e Aquisições (COVID-19)"),
    (143, "Receitas (COVID-19)"),
    (156, "Conselho ou Comissão (COVID-19)"),
    (132, "Coronavírus (COVID-19)"),
    (222, "Vacinação (COVID-19)"),
    (8, "Contratos e Aditivos"),
    (9, "Licitações, Dispensas e Outros"),
    (41, "Atas de Registro de Preço"),
    (1012, "Plano Anual de Contratações"),
    (77, "Atas de Adesão"),
    (55, "Atas das Licitações"),
    (219, "Fiscal de Contratos"),
    (34, "Editais"),
    (371, "Legislação Tributária Municipal"),
    (631, "Renúncias Fiscais"),
    (153, "Despesas com Obras"),
    (76, "Ordem Cronológica dos Pagamentos"),
    (311, "Tabela de Diárias (Valores)"),
    (33, "Termo de Convênios"),
    (106, "Prestação de Contas de OSCIPS"),
    (248, "Emendas Parlamentares"),
    (481, "Emendas Parlamentares Recebidas"),
    (104, "Termo de Fomento, Colaboração e/ou Adesão de Cooperação"),
    (458, "Audiências Públicas"),
    (881, "Consultas Públicas"),
    (1, "Plano Plurianual (PPA)"),
    (2, "Lei de Diretrizes Orçamentárias (LDO)"),
    (3, "Lei Orçamentária Anual (LOA)"),
    (4, "Relatório Res. Execução Orçamentária (RREO)"),
    (5, "Relatório Gestão Fiscal (RGF)"),
    (7, "Balanço Anual"),
    (6, "Balancetes Mensais"),
    (60, "Créditos Suplementares"),
    (590, "Relatório Circunstanciado de Anos Anteriores"),
    (64, "Concursos em Andamento"),
    (1390, "Resultados dos Concursos"),
    (1342, "Listagem dos Terceirizados"),
    (39, "Relatório Estatístico do e-SIC"),
    (555, "Relatório estatístico de ouvidoria"),
    (1255, "Pesquisa de satisfação"),
    (99, "Plano Anual de Auditoria Interna (PAAI)"),
    (57, "Instruções Normativas (INs)"),
    (56, "Auditorias e Inspeções"),
    (63, "Recomendações e Pareceres Técnicos"),
    (58, "Relatórios do Controle Interno"),
    (59, "Legislação Específica"),
    (36, "Prestação de Contas Anual (PCA)"),
    (61, "Parecer do Tribunal de Contas"),
    (1074, "Julgamento das Contas da Câmara"),
    (1241, "Plano Estratégico Institucional"),
    (230, "Plano de Ação (SIAFIC)"),
    (2019, "Plano de Saúde"),
    (557, "Programação Anual de Saúde - PAS"),
    (558, "Relatório Anual de Gestão - RAG"),
    (514, "Agenda da Secretária de Saúde"),
    (515, "Ações de Controle Interno do FMS"),
    (914, "Contratos de Gestão com Organizações Sociais"),
    (547, "Conferência de Saúde"),
    (1346, "Lista de espera nas Creches Públicas"),
    (656, "Legislação Específica da Ouvidoria"),
    (747, "Dúvidas Frequentes"),
    (2172, "Plano de Dados Abertos - PDA"),
    (272, "Conselho Municipal de Defesa Civil"),
    (277, "Conselho do Fundo de Desenvolvimento Municipal"),
    (454, "Conselho Municipal de Cultura"),
    (605, "Conselho Municipal de Saúde"),
    (606, "Conselho Municipal de Educação"),
    (611, "Conselho Mun. de Defesa dos Direitos da Pessoa Idosa"),
    (868, "Conselho dos Direitos da Criança e do Adolescente"),
    (874, "Conselho Municipal de Desenvolvimento Rural"),
    (1307, "Quantitativos Executados e Preços Praticados"),
    (2167, "Estudo de Impactos das Obras"),
];
