use serde::Serialize;

pub struct DimensionProfile {
    pub code: char,
    pub name: &'static str,
    pub description: &'static str,
    pub careers: [&'static str; 8],
}

pub static DIMENSIONS: [DimensionProfile; 6] = [
    DimensionProfile {
        code: 'R',
        name: "Réaliste",
        description: "Personnes qui préfèrent les activités concrètes, techniques et manuelles. Elles aiment travailler avec des outils, des machines et dans des environnements structurés.",
        careers: [
            "Ingénieur civil",
            "Technicien informatique",
            "Électricien",
            "Mécanicien",
            "Agriculteur",
            "Architecte",
            "Pilote",
            "Géomètre",
        ],
    },
    DimensionProfile {
        code: 'I',
        name: "Investigateur",
        description: "Personnes curieuses qui aiment observer, analyser, résoudre des problèmes et comprendre les phénomènes. Elles préfèrent la réflexion à l'action.",
        careers: [
            "Chercheur scientifique",
            "Médecin",
            "Pharmacien",
            "Biologiste",
            "Mathématicien",
            "Statisticien",
            "Vétérinaire",
            "Chimiste",
        ],
    },
    DimensionProfile {
        code: 'A',
        name: "Artistique",
        description: "Personnes créatives qui apprécient l'expression artistique, l'originalité et les environnements non structurés. Elles valorisent l'esthétique et l'innovation.",
        careers: [
            "Graphiste",
            "Architecte d'intérieur",
            "Musicien",
            "Journaliste",
            "Designer",
            "Photographe",
            "Écrivain",
            "Artiste",
        ],
    },
    DimensionProfile {
        code: 'S',
        name: "Social",
        description: "Personnes bienveillantes qui aiment aider, enseigner et prendre soin des autres. Elles recherchent l'interaction humaine et le travail d'équipe.",
        careers: [
            "Enseignant",
            "Infirmier",
            "Psychologue",
            "Travailleur social",
            "Conseiller d'orientation",
            "Éducateur",
            "Sage-femme",
            "Assistant social",
        ],
    },
    DimensionProfile {
        code: 'E',
        name: "Entreprenant",
        description: "Personnes ambitieuses qui aiment diriger, persuader et prendre des initiatives. Elles recherchent le pouvoir, le statut et les défis.",
        careers: [
            "Manager",
            "Chef d'entreprise",
            "Commercial",
            "Avocat",
            "Responsable marketing",
            "Directeur des ventes",
            "Consultant",
            "Entrepreneur",
        ],
    },
    DimensionProfile {
        code: 'C',
        name: "Conventionnel",
        description: "Personnes organisées qui préfèrent l'ordre, la précision et le respect des procédures. Elles excellent dans les tâches structurées et détaillées.",
        careers: [
            "Comptable",
            "Secrétaire",
            "Gestionnaire de données",
            "Auditeur",
            "Banquier",
            "Administrateur",
            "Bibliothécaire",
            "Analyste financier",
        ],
    },
];

pub fn dimension(code: char) -> Option<&'static DimensionProfile> {
    DIMENSIONS.iter().find(|d| d.code == code)
}

#[derive(Debug, Clone, Serialize)]
pub struct CareerSuggestions {
    pub holland_code: String,
    pub matching_careers: Vec<String>,
    pub partially_matching_careers: Vec<String>,
    pub description: String,
}

/// Careers for an already-normalized Holland code: every career of the
/// leading letter, then the first three of each following letter.
pub fn careers_for_code(code: &str) -> CareerSuggestions {
    let mut letters = code.chars().filter_map(dimension);

    let (matching_careers, description) = match letters.next() {
        Some(primary) => (
            primary.careers.iter().map(|c| c.to_string()).collect(),
            primary.description.to_string(),
        ),
        None => (Vec::new(), String::new()),
    };

    let partially_matching_careers = letters
        .flat_map(|d| d.careers.iter().take(3))
        .map(|c| c.to_string())
        .collect();

    CareerSuggestions {
        holland_code: code.to_string(),
        matching_careers,
        partially_matching_careers,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dimension_has_profile() {
        for code in crate::riasec::scoring::DIMENSION_ORDER {
            let d = dimension(code).unwrap();
            assert_eq!(d.careers.len(), 8);
        }
        assert!(dimension('X').is_none());
    }

    #[test]
    fn test_careers_for_full_code() {
        let suggestions = careers_for_code("IAS");
        assert_eq!(suggestions.matching_careers.len(), 8);
        assert_eq!(suggestions.matching_careers[0], "Chercheur scientifique");
        assert_eq!(
            suggestions.partially_matching_careers,
            vec![
                "Graphiste",
                "Architecte d'intérieur",
                "Musicien",
                "Enseignant",
                "Infirmier",
                "Psychologue"
            ]
        );
        assert!(suggestions.description.starts_with("Personnes curieuses"));
    }

    #[test]
    fn test_single_letter_has_no_secondary() {
        let suggestions = careers_for_code("C");
        assert_eq!(suggestions.matching_careers.last().unwrap(), "Analyste financier");
        assert!(suggestions.partially_matching_careers.is_empty());
    }
}
