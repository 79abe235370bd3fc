//! Sample Markdown documents for demonstration and testing.
//!
//! Each sample exercises different block types the extent estimator prices:
//! headings, paragraphs, lists, fenced code, and tables.

/// Short report-style document.
pub fn report_sample() -> &'static str {
    r#"# Quarterly Report

## Summary

Revenue grew across all segments. The preview on the left should match the
printed pages exactly, including margins and page breaks.

## Highlights

- Shipped the new onboarding flow
- Cut page render time by 40%
- Expanded to two new regions

## Figures

| Segment | Q1 | Q2 |
| ------- | -- | -- |
| Web     | 40 | 52 |
| Mobile  | 31 | 44 |
| API     | 12 | 19 |

Full figures are attached in the appendix.
"#
}

/// Document touring every supported Markdown feature.
pub fn feature_tour_sample() -> &'static str {
    r#"# Feature Tour

Paragraphs wrap to the configured print width. Adjust the margin or paper
size and watch the page boundaries move.

## Code

```rust
fn main() {
    println!("pages match print");
}
```

## Lists

1. First
2. Second
3. Third

> Block quotes render as indented paragraphs.

---

Final paragraph after a rule.
"#
}
