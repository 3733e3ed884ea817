//! Keyword-based category classifier
//!
//! Each category owns a fixed keyword list. A keyword scores its character
//! length when it appears in the text as a whole word; the category with the
//! highest total wins and ties keep the earlier table entry.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Category;

const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "food", "grocery", "groceries", "restaurant", "lunch", "dinner", "breakfast",
            "snack", "coffee", "tea", "cafe", "pizza", "burger", "chicken", "rice", "biryani",
            "dosa", "swiggy", "zomato", "ubereats", "doordash", "takeout", "takeaway", "eat",
            "eating", "meal", "drink", "juice", "milk", "bread", "fruit", "vegetables",
            "cooking", "kitchen", "bakery", "ice cream", "dessert",
        ],
    ),
    (
        Category::Transport,
        &[
            "uber", "ola", "lyft", "taxi", "cab", "bus", "train", "metro", "subway", "fuel",
            "petrol", "diesel", "gas", "gasoline", "parking", "toll", "flight", "airline",
            "ticket", "travel", "commute", "auto", "rickshaw", "rapido", "bike", "car wash",
            "car service", "vehicle", "transport",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shopping", "amazon", "flipkart", "myntra", "clothes", "shoes", "shirt", "dress",
            "jeans", "bag", "accessories", "watch", "jewelry", "electronics", "phone", "laptop",
            "gadget", "headphones", "earbuds", "gift", "present", "furniture", "decor",
            "cosmetics", "makeup", "perfume",
        ],
    ),
    (
        Category::Bills,
        &[
            "electricity", "electric", "power", "water", "gas bill", "internet", "wifi",
            "broadband", "mobile", "phone bill", "recharge", "postpaid", "prepaid",
            "subscription", "insurance", "premium", "tax", "emi", "installment", "utility",
            "utilities", "bill", "maintenance",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "movie", "cinema", "theatre", "netflix", "spotify", "prime", "hotstar", "disney",
            "game", "gaming", "xbox", "playstation", "steam", "concert", "party", "club", "bar",
            "pub", "drinks", "alcohol", "beer", "wine", "event", "ticket", "music",
            "youtube premium", "streaming",
        ],
    ),
    (
        Category::Health,
        &[
            "doctor", "hospital", "clinic", "medicine", "pharmacy", "medical", "health", "gym",
            "fitness", "yoga", "dentist", "eye", "dental", "therapy", "physiotherapy",
            "lab test", "blood test", "checkup", "prescription", "vitamin", "supplement",
            "surgical",
        ],
    ),
    (
        Category::Education,
        &[
            "course", "class", "tuition", "fees", "book", "books", "stationery", "pen",
            "notebook", "udemy", "coursera", "college", "school", "university", "exam",
            "certification", "training", "tutorial", "workshop", "seminar", "library", "study",
            "learning", "education",
        ],
    ),
    (
        Category::Salary,
        &[
            "salary", "paycheck", "wages", "monthly pay", "pay day", "stipend", "compensation",
            "payroll",
        ],
    ),
    (
        Category::Freelance,
        &[
            "freelance", "freelancing", "client", "project", "gig", "side hustle", "contract",
            "consulting", "upwork", "fiverr",
        ],
    ),
    (
        Category::Investment,
        &[
            "investment", "invest", "stock", "shares", "mutual fund", "sip", "crypto",
            "bitcoin", "dividend", "interest", "fixed deposit", "fd", "bond", "returns",
            "portfolio", "trading",
        ],
    ),
    (
        Category::Housing,
        &[
            "rent", "lease", "mortgage", "apartment", "house", "room", "accommodation",
            "housing", "hostel", "pg", "flat", "property", "landlord", "tenant",
        ],
    ),
];

/// A compiled keyword: its score weight and whole-word matcher
struct Keyword {
    weight: usize,
    pattern: Regex,
}

static TABLE: Lazy<Vec<(Category, Vec<Keyword>)>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .map(|(category, words)| {
            let compiled = words
                .iter()
                .filter_map(|word| {
                    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
                        .ok()
                        .map(|pattern| Keyword {
                            weight: word.chars().count(),
                            pattern,
                        })
                })
                .collect();
            (*category, compiled)
        })
        .collect()
});

/// Result of classifying a piece of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryMatch {
    pub category: Category,
    /// min(score / 10, 1)
    pub confidence: f64,
}

/// Classify free text into a category
pub fn detect_category(text: &str) -> CategoryMatch {
    let mut best = Category::Other;
    let mut best_score = 0usize;

    for (category, keywords) in TABLE.iter() {
        let score: usize = keywords
            .iter()
            .filter(|k| k.pattern.is_match(text))
            .map(|k| k.weight)
            .sum();

        if score > best_score {
            best_score = score;
            best = *category;
        }
    }

    CategoryMatch {
        category: best,
        confidence: (best_score as f64 / 10.0).min(1.0),
    }
}

/// Every category except `Other`, in table order
pub fn categories() -> Vec<Category> {
    KEYWORDS.iter().map(|(c, _)| *c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_keywords() {
        assert_eq!(detect_category("spent 200 on food").category, Category::Food);
        assert_eq!(detect_category("uber to office").category, Category::Transport);
        assert_eq!(detect_category("Received salary").category, Category::Salary);
        assert_eq!(detect_category("paid the RENT").category, Category::Housing);
    }

    #[test]
    fn test_whole_word_only() {
        // "pen" must not match inside "spent"
        let m = detect_category("spent 50");
        assert_eq!(m.category, Category::Other);
        assert_eq!(m.confidence, 0.0);
    }

    #[test]
    fn test_confidence_scales_with_keyword_length() {
        let m = detect_category("coffee");
        assert_eq!(m.category, Category::Food);
        assert!((m.confidence - 0.6).abs() < 1e-9);

        let m = detect_category("electricity");
        assert_eq!(m.category, Category::Bills);
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_multi_word_keyword() {
        assert_eq!(detect_category("youtube premium renewal").category, Category::Entertainment);
        assert_eq!(detect_category("ice cream").category, Category::Food);
    }

    #[test]
    fn test_tie_keeps_earlier_category() {
        // "ticket" scores 6 for both transport and entertainment
        assert_eq!(detect_category("ticket").category, Category::Transport);
    }

    #[test]
    fn test_highest_score_wins() {
        // gas (transport, 3) vs gas bill (bills, 8)
        assert_eq!(detect_category("gas bill").category, Category::Bills);
    }

    #[test]
    fn test_categories_excludes_other() {
        let all = categories();
        assert_eq!(all.len(), 11);
        assert!(!all.contains(&Category::Other));
    }
}
