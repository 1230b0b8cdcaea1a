use serde::{Deserialize, Serialize};

/// Whether a transaction adds to or draws from the user's money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    /// Render with a leading capital, e.g. "Income" (used by the CSV display layout).
    pub fn display_name(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fixed category set. Income transactions use the income categories,
/// expense transactions the rest; `Other` is valid for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salary,
    Freelance,
    Investments,
    Housing,
    Transportation,
    Food,
    Utilities,
    Healthcare,
    Insurance,
    Entertainment,
    Education,
    Shopping,
    Personal,
    Debt,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Freelance => "freelance",
            Category::Investments => "investments",
            Category::Housing => "housing",
            Category::Transportation => "transportation",
            Category::Food => "food",
            Category::Utilities => "utilities",
            Category::Healthcare => "healthcare",
            Category::Insurance => "insurance",
            Category::Entertainment => "entertainment",
            Category::Education => "education",
            Category::Shopping => "shopping",
            Category::Personal => "personal",
            Category::Debt => "debt",
            Category::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "salary" => Some(Category::Salary),
            "freelance" => Some(Category::Freelance),
            "investments" => Some(Category::Investments),
            "housing" => Some(Category::Housing),
            "transportation" => Some(Category::Transportation),
            "food" => Some(Category::Food),
            "utilities" => Some(Category::Utilities),
            "healthcare" => Some(Category::Healthcare),
            "insurance" => Some(Category::Insurance),
            "entertainment" => Some(Category::Entertainment),
            "education" => Some(Category::Education),
            "shopping" => Some(Category::Shopping),
            "personal" => Some(Category::Personal),
            "debt" => Some(Category::Debt),
            "other" => Some(Category::Other),
            _ => None,
        }
    }

    /// Whether this category may appear on a transaction of the given type.
    pub fn valid_for(&self, kind: TransactionType) -> bool {
        match kind {
            TransactionType::Income => matches!(
                self,
                Category::Salary | Category::Freelance | Category::Investments | Category::Other
            ),
            TransactionType::Expense => !matches!(
                self,
                Category::Salary | Category::Freelance | Category::Investments
            ),
        }
    }

    /// Whether a budget may be defined for this category.
    /// Budgets track recurring spending, so `debt` and the income
    /// categories are excluded.
    pub fn budgetable(&self) -> bool {
        self.valid_for(TransactionType::Expense) && *self != Category::Debt
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
