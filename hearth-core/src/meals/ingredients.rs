use once_cell::sync::Lazy;
use regex::Regex;

/// Cooking units recognised after a leading quantity, longest first so that
/// "tablespoons" wins over "t".
const UNITS: &[&str] = &[
    "tablespoons", "milliliters", "tablespoon", "kilograms", "milliliter", "teaspoons",
    "envelopes", "kilogram", "packages", "teaspoon", "envelope", "gallons", "package",
    "bunches", "pinches", "ounces", "pounds", "pieces", "slices", "sprigs", "liters", "quarts",
    "cloves", "dashes", "gallon", "ounce", "pound", "piece", "slice", "sprig", "liter", "quart",
    "clove", "pints", "grams", "bunch", "heads", "pinch", "dash", "cups", "tbsp", "pint", "gram",
    "head", "cans", "lbs", "tsp", "cup", "can", "pkg", "gal", "oz", "lb", "kg", "ml", "pt", "qt",
    "pc", "c", "t", "g", "l",
];

const UNICODE_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

static NUMERIC_PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\d[^)]*\)").expect("parenthetical pattern is valid"));
static TRAILING_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*,\s*(?:divided|cut into.*|warmed).*$").expect("phrase pattern is valid")
});
static TRAILING_METRIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+\d+(?:\.\d+)?\s*(?:ml|kg|g|l)\s*$").expect("metric pattern is valid")
});
static INNER_METRIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+\d+(?:\.\d+)?\s*(?:ml|kg|g|l)\s+").expect("metric pattern is valid")
});
static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+\s+\d+/\d+|\d+/\d+|\d+\.\d+|\d+)").expect("quantity pattern is valid")
});
static UNIT: Lazy<Regex> = Lazy::new(|| {
    let alternatives = UNITS
        .iter()
        .map(|unit| regex::escape(unit))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)^({alternatives})\b\.?\s+")).expect("unit pattern is valid")
});
static TRAILING_NOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("note pattern is valid"));

/// An ingredient line split for a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIngredient {
    /// Amount with its unit ("3/4 pound"), or the bare amount ("2").
    pub quantity: Option<String>,
    pub name: String,
}

/// Splits "3/4 pound linguine" into `3/4 pound` and `linguine`.
///
/// Unicode fractions are expanded ("1½" reads as "1 1/2"), metric
/// conversions and numeric parentheticals are dropped. When nothing is left
/// of the name the trimmed input is used instead.
pub fn parse_ingredient(raw: &str) -> ParsedIngredient {
    let line = raw.trim();
    let expanded = expand_fractions(line);
    let cleaned = NUMERIC_PARENTHETICAL.replace_all(&expanded, "");
    let cleaned = TRAILING_PHRASE.replace(&cleaned, "");
    let cleaned = TRAILING_METRIC.replace(&cleaned, "");

    let (quantity, remaining) = match QUANTITY.captures(&cleaned) {
        Some(captures) => {
            let amount = captures[1].split_whitespace().collect::<Vec<_>>().join(" ");
            (Some(amount), cleaned[captures[0].len()..].trim().to_string())
        }
        None => (None, cleaned.trim().to_string()),
    };
    let remaining = INNER_METRIC.replace_all(&remaining, " ");
    let remaining = remaining.trim();

    let (unit, name) = match UNIT.captures(remaining) {
        Some(captures) => (
            Some(captures[1].to_string()),
            remaining[captures[0].len()..].trim(),
        ),
        None => (None, remaining),
    };
    let quantity = match (quantity, unit) {
        (Some(amount), Some(unit)) => Some(format!("{amount} {unit}")),
        (amount, _) => amount,
    };

    let name = name.trim_start_matches(|c: char| matches!(c, ',' | ';' | ':') || c.is_whitespace());
    let name = TRAILING_NOTE.replace(name, "");
    let name = name.trim_end_matches(['.', ',', ';', ':']);
    let name = name
        .split_whitespace()
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ");

    ParsedIngredient {
        quantity,
        name: if name.is_empty() {
            line.to_string()
        } else {
            name
        },
    }
}

fn expand_fractions(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '⁄' {
            out.push('/');
            continue;
        }
        match UNICODE_FRACTIONS.iter().find(|(fraction, _)| *fraction == c) {
            Some((_, ascii)) => {
                if out.ends_with(|prev: char| prev.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(ascii);
            }
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(quantity: Option<&str>, name: &str) -> ParsedIngredient {
        ParsedIngredient {
            quantity: quantity.map(str::to_string),
            name: name.to_string(),
        }
    }

    #[test]
    fn splits_quantity_unit_and_name() {
        assert_eq!(parse_ingredient("3/4 pound linguine"), ingredient(Some("3/4 pound"), "linguine"));
        assert_eq!(parse_ingredient("2 eggs"), ingredient(Some("2"), "eggs"));
        assert_eq!(parse_ingredient("1 1/2 cups flour"), ingredient(Some("1 1/2 cups"), "flour"));
        assert_eq!(parse_ingredient("2 Tbsp. olive oil"), ingredient(Some("2 Tbsp"), "olive oil"));
        assert_eq!(parse_ingredient("Salt"), ingredient(None, "Salt"));
    }

    #[test]
    fn expands_unicode_fractions() {
        assert_eq!(parse_ingredient("1½ cups milk"), ingredient(Some("1 1/2 cups"), "milk"));
        assert_eq!(parse_ingredient("¾ cup sugar"), ingredient(Some("3/4 cup"), "sugar"));
        assert_eq!(parse_ingredient("1⁄2 teaspoon salt"), ingredient(Some("1/2 teaspoon"), "salt"));
    }

    #[test]
    fn drops_metric_conversions_and_notes() {
        assert_eq!(parse_ingredient("1/4 cup water 60 mL"), ingredient(Some("1/4 cup"), "water"));
        assert_eq!(
            parse_ingredient("1 package yeast (1.4 oz/38.5 g)"),
            ingredient(Some("1 package"), "yeast")
        );
        assert_eq!(parse_ingredient("2 cups broth, warmed"), ingredient(Some("2 cups"), "broth"));
        assert_eq!(parse_ingredient("pork shoulder 1.5 kg roast"), ingredient(None, "pork shoulder roast"));
        assert_eq!(parse_ingredient("basil (optional)"), ingredient(None, "basil"));
    }

    #[test]
    fn keeps_numbers_that_belong_to_the_name() {
        assert_eq!(parse_ingredient("1 cup 2% milk"), ingredient(Some("1 cup"), "2% milk"));
        assert_eq!(parse_ingredient("3"), ingredient(Some("3"), "3"));
    }
}
