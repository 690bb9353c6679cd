use std::fmt;

/// The fixed set of cleaning services the site writes about.
///
/// Topics and posts store the category as text so that rows inserted by
/// hand with an unknown value still flow through the pipeline; the enum
/// is used for seeding and for category-keyed lookups with a generic
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCategory {
    Fensterreinigung,
    Bueroreinigung,
    Unterhaltsreinigung,
    Grundreinigung,
    Treppenhausreinigung,
    Bauendreinigung,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 6] = [
        ServiceCategory::Fensterreinigung,
        ServiceCategory::Bueroreinigung,
        ServiceCategory::Unterhaltsreinigung,
        ServiceCategory::Grundreinigung,
        ServiceCategory::Treppenhausreinigung,
        ServiceCategory::Bauendreinigung,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Fensterreinigung => "fensterreinigung",
            ServiceCategory::Bueroreinigung => "bueroreinigung",
            ServiceCategory::Unterhaltsreinigung => "unterhaltsreinigung",
            ServiceCategory::Grundreinigung => "grundreinigung",
            ServiceCategory::Treppenhausreinigung => "treppenhausreinigung",
            ServiceCategory::Bauendreinigung => "bauendreinigung",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value.trim().to_lowercase())
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
