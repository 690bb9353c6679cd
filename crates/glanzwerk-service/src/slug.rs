/// URL-safe slugs derived from generated titles.
///
/// German umlauts are transliterated rather than dropped so that
/// "Büroreinigung" becomes "bueroreinigung" instead of "broreinigung".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = true; // suppress leading dashes

    for ch in title.chars() {
        match ch {
            'ä' | 'Ä' => push_str(&mut slug, "ae", &mut last_was_dash),
            'ö' | 'Ö' => push_str(&mut slug, "oe", &mut last_was_dash),
            'ü' | 'Ü' => push_str(&mut slug, "ue", &mut last_was_dash),
            'ß' => push_str(&mut slug, "ss", &mut last_was_dash),
            c if c.is_ascii_alphanumeric() => {
                slug.push(c.to_ascii_lowercase());
                last_was_dash = false;
            }
            _ => {
                if !last_was_dash {
                    slug.push('-');
                    last_was_dash = true;
                }
            }
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

fn push_str(slug: &mut String, replacement: &str, last_was_dash: &mut bool) {
    slug.push_str(replacement);
    *last_was_dash = false;
}
