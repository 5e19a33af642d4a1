use super::*;

#[test]
fn prepend_puts_dir_first() {
    let sp = SearchPath::new(["/a", "/b"]);
    sp.prepend("/z");
    assert_eq!(sp.snapshot(), vec!["/z", "/a", "/b"]);
}

#[test]
fn append_puts_dir_last() {
    let sp = SearchPath::new(["/a"]);
    sp.append("/z");
    assert_eq!(sp.snapshot(), vec!["/a", "/z"]);
}

#[test]
fn add_dispatches_on_after_flag() {
    let sp = SearchPath::new(["/a"]);
    sp.add("/before", false);
    sp.add("/after", true);
    assert_eq!(sp.snapshot(), vec!["/before", "/a", "/after"]);
}

#[test]
fn snapshot_is_unaffected_by_later_mutation() {
    let sp = SearchPath::new(["/a"]);
    let snap = sp.snapshot();
    sp.append("/b");
    assert_eq!(snap, vec!["/a"]);
    assert_eq!(sp.snapshot(), vec!["/a", "/b"]);
}

#[test]
fn replace_overwrites_wholesale() {
    let sp = SearchPath::new(["/a", "/b", "/c"]);
    sp.replace(sp.snapshot()[1..].to_vec());
    assert_eq!(sp.snapshot(), vec!["/b", "/c"]);
}
