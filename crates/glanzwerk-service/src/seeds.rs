use crate::categories::ServiceCategory;
use crate::models::NewTopic;

/// Built-in topic backlog, inserted when the unused count drops below
/// the configured threshold. Duplicate texts across repeated seedings
/// are tolerated by design; the scheduler consumes in insertion order.
pub fn seed_topics() -> Vec<NewTopic> {
    use ServiceCategory::*;

    vec![
        NewTopic::new(
            "Fenster putzen ohne Streifen: die Profi-Methode",
            Fensterreinigung,
            &["Fensterreinigung", "Streifen", "Abzieher"],
        ),
        NewTopic::new(
            "Wie oft sollten Bürofenster gereinigt werden?",
            Fensterreinigung,
            &["Fensterreinigung", "Büro", "Intervall"],
        ),
        NewTopic::new(
            "Büroreinigung nach Feierabend: So stören Reinigungskräfte nie",
            Bueroreinigung,
            &["Büroreinigung", "Feierabend", "Reinigungsplan"],
        ),
        NewTopic::new(
            "Hygiene im Großraumbüro: die unterschätzten Keimherde",
            Bueroreinigung,
            &["Büroreinigung", "Hygiene", "Desinfektion"],
        ),
        NewTopic::new(
            "Unterhaltsreinigung vs. Grundreinigung: Was braucht Ihr Gebäude?",
            Unterhaltsreinigung,
            &["Unterhaltsreinigung", "Grundreinigung", "Vergleich"],
        ),
        NewTopic::new(
            "Reinigungsintervalle richtig planen: ein Leitfaden für Hausverwaltungen",
            Unterhaltsreinigung,
            &["Unterhaltsreinigung", "Hausverwaltung", "Intervall"],
        ),
        NewTopic::new(
            "Grundreinigung im Frühjahr: Checkliste für Gewerbeflächen",
            Grundreinigung,
            &["Grundreinigung", "Frühjahrsputz", "Checkliste"],
        ),
        NewTopic::new(
            "Steinböden richtig tiefenreinigen und versiegeln",
            Grundreinigung,
            &["Grundreinigung", "Steinboden", "Versiegelung"],
        ),
        NewTopic::new(
            "Treppenhausreinigung: Pflichten von Vermietern und Mietern",
            Treppenhausreinigung,
            &["Treppenhausreinigung", "Vermieter", "Kehrwoche"],
        ),
        NewTopic::new(
            "Rutschfeste Treppen: Sicherheit durch regelmäßige Reinigung",
            Treppenhausreinigung,
            &["Treppenhausreinigung", "Sicherheit", "Rutschgefahr"],
        ),
        NewTopic::new(
            "Bauendreinigung: Wann der richtige Zeitpunkt vor der Übergabe ist",
            Bauendreinigung,
            &["Bauendreinigung", "Bauabnahme", "Übergabe"],
        ),
        NewTopic::new(
            "Baustaub restlos entfernen: Methoden der Bauendreinigung",
            Bauendreinigung,
            &["Bauendreinigung", "Baustaub", "Feinreinigung"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::ServiceCategory;

    #[test]
    fn every_category_has_at_least_one_seed_topic() {
        let topics = seed_topics();
        for category in ServiceCategory::ALL {
            assert!(
                topics.iter().any(|topic| topic.category == category.as_str()),
                "no seed topic for {category}"
            );
        }
    }

    #[test]
    fn seed_keywords_are_valid_json_arrays() {
        for topic in seed_topics() {
            let decoded: Vec<String> = serde_json::from_str(&topic.keywords).unwrap();
            assert!(!decoded.is_empty());
        }
    }
}
