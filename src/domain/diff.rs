//! Package list comparison between two channels.

use std::cmp::Ordering;

/// Compare two package lists.
///
/// Both sides are sorted and deduplicated first. Entries present only in
/// `source` come out as `-entry`, entries only in `target` as `+entry`, in
/// sorted order.
pub fn package_diff(source: &[String], target: &[String]) -> Vec<String> {
    let src = normalize(source);
    let dst = normalize(target);

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < src.len() && j < dst.len() {
        match src[i].cmp(dst[j]) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(format!("-{}", src[i]));
                i += 1;
            }
            Ordering::Greater => {
                out.push(format!("+{}", dst[j]));
                j += 1;
            }
        }
    }
    out.extend(src[i..].iter().map(|s| format!("-{s}")));
    out.extend(dst[j..].iter().map(|s| format!("+{s}")));
    out
}

fn normalize(list: &[String]) -> Vec<&str> {
    let mut v: Vec<&str> = list.iter().map(String::as_str).collect();
    v.sort_unstable();
    v.dedup();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn given_identical_lists_when_diffing_then_empty() {
        let a = s(&["a-1-1.noarch", "b-1-1.noarch"]);
        assert!(package_diff(&a, &a).is_empty());
    }

    #[test]
    fn given_disjoint_entries_when_diffing_then_marks_both_sides() {
        let src = s(&["bash-5.1-1.x86_64", "vim-9.0-1.x86_64"]);
        let dst = s(&["bash-5.1-2.x86_64", "vim-9.0-1.x86_64"]);
        assert_eq!(
            package_diff(&src, &dst),
            s(&["-bash-5.1-1.x86_64", "+bash-5.1-2.x86_64"])
        );
    }

    #[test]
    fn given_unsorted_input_with_duplicates_when_diffing_then_normalizes() {
        let src = s(&["c", "a", "a"]);
        let dst = s(&["a", "b"]);
        assert_eq!(package_diff(&src, &dst), s(&["+b", "-c"]));
    }

    #[test]
    fn given_empty_target_when_diffing_then_all_removed() {
        let src = s(&["x", "y"]);
        assert_eq!(package_diff(&src, &[]), s(&["-x", "-y"]));
    }
}
