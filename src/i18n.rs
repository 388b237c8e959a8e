//! English and Arabic strings for notices, labels and categories.

use crate::models::Category;
use crate::stats::YearMonth;

/// Key under which the chosen language is kept in local storage.
pub const LANGUAGE_KEY: &str = "expense-tracker-language";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Language {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "ar" | "arabic" => Some(Self::Ar),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::En => Direction::Ltr,
            Self::Ar => Direction::Rtl,
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.direction() == Direction::Rtl
    }

    /// The other language, for the toggle.
    pub fn toggled(&self) -> Self {
        match self {
            Self::En => Self::Ar,
            Self::Ar => Self::En,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// User-facing notices raised by the store and the auth flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    ExpenseAdded,
    ExpenseUpdated,
    ExpenseDeleted,
    LoginSuccess,
    RegisterSuccess,
    LogoutSuccess,
    Error,
}

impl MessageKey {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ExpenseAdded => "expenseAdded",
            Self::ExpenseUpdated => "expenseUpdated",
            Self::ExpenseDeleted => "expenseDeleted",
            Self::LoginSuccess => "loginSuccess",
            Self::RegisterSuccess => "registerSuccess",
            Self::LogoutSuccess => "logoutSuccess",
            Self::Error => "error",
        }
    }
}

pub fn message(key: MessageKey, lang: Language) -> &'static str {
    use MessageKey::*;
    match lang {
        Language::En => match key {
            ExpenseAdded => "Expense added successfully",
            ExpenseUpdated => "Expense updated successfully",
            ExpenseDeleted => "Expense deleted successfully",
            LoginSuccess => "Login successful",
            RegisterSuccess => "Registration successful",
            LogoutSuccess => "Logout successful",
            Error => "Error",
        },
        Language::Ar => match key {
            ExpenseAdded => "تم إضافة المصروف بنجاح",
            ExpenseUpdated => "تم تحديث المصروف بنجاح",
            ExpenseDeleted => "تم حذف المصروف بنجاح",
            LoginSuccess => "تم تسجيل الدخول بنجاح",
            RegisterSuccess => "تم إنشاء الحساب بنجاح",
            LogoutSuccess => "تم تسجيل الخروج بنجاح",
            Error => "خطأ",
        },
    }
}

/// Headings and captions used by the dashboard and the expense table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Dashboard,
    Expenses,
    TotalExpenses,
    ThisMonth,
    AveragePerExpense,
    CategoriesUsed,
    ExpensesByCategory,
    MonthlySpending,
    NoExpenses,
    Loading,
    Title,
    Amount,
    Category,
    Date,
    Description,
    DeleteExpenseConfirmation,
}

pub fn label(label: Label, lang: Language) -> &'static str {
    use Label::*;
    match lang {
        Language::En => match label {
            Dashboard => "Dashboard",
            Expenses => "Expenses",
            TotalExpenses => "Total Expenses",
            ThisMonth => "This Month",
            AveragePerExpense => "Average per Expense",
            CategoriesUsed => "Categories Used",
            ExpensesByCategory => "Expenses By Category",
            MonthlySpending => "Monthly Spending",
            NoExpenses => "No expenses found",
            Loading => "Loading...",
            Title => "Title",
            Amount => "Amount",
            Category => "Category",
            Date => "Date",
            Description => "Description",
            DeleteExpenseConfirmation => "Are you sure you want to delete this expense?",
        },
        Language::Ar => match label {
            Dashboard => "لوحة التحكم",
            Expenses => "المصروفات",
            TotalExpenses => "إجمالي المصروفات",
            ThisMonth => "هذا الشهر",
            AveragePerExpense => "متوسط المصروفات",
            CategoriesUsed => "الفئات المستخدمة",
            ExpensesByCategory => "الإنفاق حسب الفئة",
            MonthlySpending => "الإنفاق الشهري",
            NoExpenses => "لا توجد مصروفات",
            Loading => "جاري التحميل...",
            Title => "العنوان",
            Amount => "المبلغ",
            Category => "الفئة",
            Date => "التاريخ",
            Description => "الوصف",
            DeleteExpenseConfirmation => "هل أنت متأكد أنك تريد حذف هذه المصروفات؟",
        },
    }
}

pub fn category_label(category: Category, lang: Language) -> &'static str {
    match lang {
        Language::En => match category {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Education => "Education",
            Category::Travel => "Travel",
            Category::Other => "Other",
        },
        Language::Ar => match category {
            Category::Food => "طعام",
            Category::Transport => "مواصلات",
            Category::Entertainment => "ترفيه",
            Category::Health => "صحة",
            Category::Shopping => "تسوق",
            Category::Bills => "فواتير",
            Category::Education => "تعليم",
            Category::Travel => "سفر",
            Category::Other => "أخرى",
        },
    }
}

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS_AR: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "أبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

/// `Jan 2024` in English, `يناير 2024` in Arabic.
pub fn month_label(month: YearMonth, lang: Language) -> String {
    let names = match lang {
        Language::En => &MONTHS_EN,
        Language::Ar => &MONTHS_AR,
    };
    let idx = (month.month as usize).saturating_sub(1).min(11);
    format!("{} {}", names[idx], month.year)
}

#[cfg(test)]
#[path = "i18n_tests.rs"]
mod i18n_tests;
