//! Closed vocabularies of the conclusion block: grape variety and country of origin.

use serde::{Deserialize, Serialize};

/// Grape variety offered in the conclusion block.
///
/// Each variant serializes to the label returned by [`Grape::label`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grape {
    #[serde(rename = "Airén")]
    Airen,
    #[serde(rename = "Albariño")]
    Albarino,
    #[serde(rename = "Barbera")]
    Barbera,
    #[serde(rename = "Cabernet Franc")]
    CabernetFranc,
    #[serde(rename = "Cabernet Sauvignon")]
    CabernetSauvignon,
    #[serde(rename = "Chardonnay")]
    Chardonnay,
    #[serde(rename = "Chenin Blanc")]
    CheninBlanc,
    #[serde(rename = "Colombard")]
    Colombard,
    #[serde(rename = "Gamay")]
    Gamay,
    #[serde(rename = "Garnacha")]
    Garnacha,
    #[serde(rename = "Gewürztraminer")]
    Gewurztraminer,
    #[serde(rename = "Macabeo")]
    Macabeo,
    #[serde(rename = "Malbec")]
    Malbec,
    #[serde(rename = "Merlot")]
    Merlot,
    #[serde(rename = "Monastrell")]
    Monastrell,
    #[serde(rename = "Moscato")]
    Moscato,
    #[serde(rename = "Nebbiolo")]
    Nebbiolo,
    #[serde(rename = "Pinot Grigio")]
    PinotGrigio,
    #[serde(rename = "Pinot Noir")]
    PinotNoir,
    #[serde(rename = "Riesling")]
    Riesling,
    #[serde(rename = "Sangiovese")]
    Sangiovese,
    #[serde(rename = "Sauvignon Blanc")]
    SauvignonBlanc,
    #[serde(rename = "Semillon")]
    Semillon,
    #[serde(rename = "Syrah")]
    Syrah,
    #[serde(rename = "Tempranillo")]
    Tempranillo,
    #[serde(rename = "Touriga Nacional")]
    TourigaNacional,
    #[serde(rename = "Trebbiano")]
    Trebbiano,
    #[serde(rename = "Verdejo")]
    Verdejo,
    #[serde(rename = "Viognier")]
    Viognier,
    #[serde(rename = "Zinfandel")]
    Zinfandel,
}

impl Grape {
    /// Every option, in the order the tasting sheet lists them.
    pub const ALL: [Grape; 30] = [
        Grape::Airen,
        Grape::Albarino,
        Grape::Barbera,
        Grape::CabernetFranc,
        Grape::CabernetSauvignon,
        Grape::Chardonnay,
        Grape::CheninBlanc,
        Grape::Colombard,
        Grape::Gamay,
        Grape::Garnacha,
        Grape::Gewurztraminer,
        Grape::Macabeo,
        Grape::Malbec,
        Grape::Merlot,
        Grape::Monastrell,
        Grape::Moscato,
        Grape::Nebbiolo,
        Grape::PinotGrigio,
        Grape::PinotNoir,
        Grape::Riesling,
        Grape::Sangiovese,
        Grape::SauvignonBlanc,
        Grape::Semillon,
        Grape::Syrah,
        Grape::Tempranillo,
        Grape::TourigaNacional,
        Grape::Trebbiano,
        Grape::Verdejo,
        Grape::Viognier,
        Grape::Zinfandel,
    ];

    /// Display name, which is also the wire value.
    pub fn label(self) -> &'static str {
        match self {
            Grape::Airen => "Airén",
            Grape::Albarino => "Albariño",
            Grape::Barbera => "Barbera",
            Grape::CabernetFranc => "Cabernet Franc",
            Grape::CabernetSauvignon => "Cabernet Sauvignon",
            Grape::Chardonnay => "Chardonnay",
            Grape::CheninBlanc => "Chenin Blanc",
            Grape::Colombard => "Colombard",
            Grape::Gamay => "Gamay",
            Grape::Garnacha => "Garnacha",
            Grape::Gewurztraminer => "Gewürztraminer",
            Grape::Macabeo => "Macabeo",
            Grape::Malbec => "Malbec",
            Grape::Merlot => "Merlot",
            Grape::Monastrell => "Monastrell",
            Grape::Moscato => "Moscato",
            Grape::Nebbiolo => "Nebbiolo",
            Grape::PinotGrigio => "Pinot Grigio",
            Grape::PinotNoir => "Pinot Noir",
            Grape::Riesling => "Riesling",
            Grape::Sangiovese => "Sangiovese",
            Grape::SauvignonBlanc => "Sauvignon Blanc",
            Grape::Semillon => "Semillon",
            Grape::Syrah => "Syrah",
            Grape::Tempranillo => "Tempranillo",
            Grape::TourigaNacional => "Touriga Nacional",
            Grape::Trebbiano => "Trebbiano",
            Grape::Verdejo => "Verdejo",
            Grape::Viognier => "Viognier",
            Grape::Zinfandel => "Zinfandel",
        }
    }
}

/// Country of origin offered in the conclusion block.
///
/// Each variant serializes to the label returned by [`Country::label`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "África do Sul")]
    AfricaDoSul,
    #[serde(rename = "Alemanha")]
    Alemanha,
    #[serde(rename = "Argentina")]
    Argentina,
    #[serde(rename = "Armênia")]
    Armenia,
    #[serde(rename = "Austrália")]
    Australia,
    #[serde(rename = "Áustria")]
    Austria,
    #[serde(rename = "Bélgica")]
    Belgica,
    #[serde(rename = "Bolívia")]
    Bolivia,
    #[serde(rename = "Brasil")]
    Brasil,
    #[serde(rename = "Bulgária")]
    Bulgaria,
    #[serde(rename = "Canadá")]
    Canada,
    #[serde(rename = "Chile")]
    Chile,
    #[serde(rename = "China")]
    China,
    #[serde(rename = "Croácia")]
    Croacia,
    #[serde(rename = "Dinamarca")]
    Dinamarca,
    #[serde(rename = "Eslovênia")]
    Eslovenia,
    #[serde(rename = "Espanha")]
    Espanha,
    #[serde(rename = "Estados Unidos")]
    EstadosUnidos,
    #[serde(rename = "França")]
    Franca,
    #[serde(rename = "Geórgia")]
    Georgia,
    #[serde(rename = "Grécia")]
    Grecia,
    #[serde(rename = "Hungria")]
    Hungria,
    #[serde(rename = "Israel")]
    Israel,
    #[serde(rename = "Itália")]
    Italia,
    #[serde(rename = "Líbano")]
    Libano,
    #[serde(rename = "Macedônia do Norte")]
    MacedoniaDoNorte,
    #[serde(rename = "Marrocos")]
    Marrocos,
    #[serde(rename = "México")]
    Mexico,
    #[serde(rename = "Moldávia")]
    Moldavia,
    #[serde(rename = "Nova Zelândia")]
    NovaZelandia,
    #[serde(rename = "Países Baixos")]
    PaisesBaixos,
    #[serde(rename = "Portugal")]
    Portugal,
    #[serde(rename = "Reino Unido")]
    ReinoUnido,
    #[serde(rename = "República Tcheca")]
    RepublicaTcheca,
    #[serde(rename = "Romênia")]
    Romenia,
    #[serde(rename = "Suíça")]
    Suica,
    #[serde(rename = "Tailândia")]
    Tailandia,
    #[serde(rename = "Tunísia")]
    Tunisia,
    #[serde(rename = "Uruguai")]
    Uruguai,
}

impl Country {
    /// Every option, in the order the tasting sheet lists them.
    pub const ALL: [Country; 39] = [
        Country::AfricaDoSul,
        Country::Alemanha,
        Country::Argentina,
        Country::Armenia,
        Country::Australia,
        Country::Austria,
        Country::Belgica,
        Country::Bolivia,
        Country::Brasil,
        Country::Bulgaria,
        Country::Canada,
        Country::Chile,
        Country::China,
        Country::Croacia,
        Country::Dinamarca,
        Country::Eslovenia,
        Country::Espanha,
        Country::EstadosUnidos,
        Country::Franca,
        Country::Georgia,
        Country::Grecia,
        Country::Hungria,
        Country::Israel,
        Country::Italia,
        Country::Libano,
        Country::MacedoniaDoNorte,
        Country::Marrocos,
        Country::Mexico,
        Country::Moldavia,
        Country::NovaZelandia,
        Country::PaisesBaixos,
        Country::Portugal,
        Country::ReinoUnido,
        Country::RepublicaTcheca,
        Country::Romenia,
        Country::Suica,
        Country::Tailandia,
        Country::Tunisia,
        Country::Uruguai,
    ];

    /// Display name, which is also the wire value.
    pub fn label(self) -> &'static str {
        match self {
            Country::AfricaDoSul => "África do Sul",
            Country::Alemanha => "Alemanha",
            Country::Argentina => "Argentina",
            Country::Armenia => "Armênia",
            Country::Australia => "Austrália",
            Country::Austria => "Áustria",
            Country::Belgica => "Bélgica",
            Country::Bolivia => "Bolívia",
            Country::Brasil => "Brasil",
            Country::Bulgaria => "Bulgária",
            Country::Canada => "Canadá",
            Country::Chile => "Chile",
            Country::China => "China",
            Country::Croacia => "Croácia",
            Country::Dinamarca => "Dinamarca",
            Country::Eslovenia => "Eslovênia",
            Country::Espanha => "Espanha",
            Country::EstadosUnidos => "Estados Unidos",
            Country::Franca => "França",
            Country::Georgia => "Geórgia",
            Country::Grecia => "Grécia",
            Country::Hungria => "Hungria",
            Country::Israel => "Israel",
            Country::Italia => "Itália",
            Country::Libano => "Líbano",
            Country::MacedoniaDoNorte => "Macedônia do Norte",
            Country::Marrocos => "Marrocos",
            Country::Mexico => "México",
            Country::Moldavia => "Moldávia",
            Country::NovaZelandia => "Nova Zelândia",
            Country::PaisesBaixos => "Países Baixos",
            Country::Portugal => "Portugal",
            Country::ReinoUnido => "Reino Unido",
            Country::RepublicaTcheca => "República Tcheca",
            Country::Romenia => "Romênia",
            Country::Suica => "Suíça",
            Country::Tailandia => "Tailândia",
            Country::Tunisia => "Tunísia",
            Country::Uruguai => "Uruguai",
        }
    }
}
