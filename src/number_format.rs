use itertools::Itertools;

/// Returned by [`to_words`] for anything past the supported range.
pub const TOO_LARGE: &str = "number too large";

const ONES: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// English word form for 0..=999, e.g. `305` -> `"three hundred five"`.
pub fn to_words(n: u32) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                ones => format!("{}-{}", tens, ONES[ones as usize]),
            }
        }
        100..=999 => {
            let hundreds = format!("{} hundred", ONES[(n / 100) as usize]);
            match n % 100 {
                0 => hundreds,
                rest => format!("{} {}", hundreds, to_words(rest)),
            }
        }
        _ => TOO_LARGE.to_string(),
    }
}

/// Nonzero place-value terms, most significant first. Zero yields `[0]`.
pub fn expanded_terms(n: u32) -> Vec<u32> {
    if n == 0 {
        return vec![0];
    }

    let mut terms = Vec::new();
    let mut place = 1u32;
    let mut rest = n;
    while rest > 0 {
        let digit = rest % 10;
        if digit != 0 {
            terms.push(digit * place);
        }
        rest /= 10;
        place = place.saturating_mul(10);
    }
    terms.reverse();
    terms
}

/// Additive expanded form, e.g. `305` -> `"300 + 5"`.
pub fn to_expanded_form(n: u32) -> String {
    expanded_terms(n).iter().join(" + ")
}

/// True when `word` is one of the tokens [`to_words`] can emit.
pub(crate) fn is_number_word(word: &str) -> bool {
    word == "hundred" || ONES.contains(&word) || TENS[2..].contains(&word)
}
