/// Moves the element at `index` to the end of both parallel sequences and
/// returns the new current index.
///
/// Removing the current element shifts everything after it left by one, so
/// the same index now points at what used to be the next question. When the
/// moved element was already last, the cursor wraps to 0.
///
/// Returns `None`, leaving both sequences untouched, when the lengths differ
/// or `index` is out of range.
pub fn defer_to_end<Q, A>(questions: &mut Vec<Q>, answers: &mut Vec<A>, index: usize) -> Option<usize> {
    let len = questions.len();
    if answers.len() != len || index >= len {
        return None;
    }

    let question = questions.remove(index);
    let answer = answers.remove(index);
    questions.push(question);
    answers.push(answer);

    Some(if index == len - 1 { 0 } else { index })
}
