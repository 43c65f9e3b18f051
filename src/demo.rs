/*!
Walks through each kind of handle in turn, writing what it observes.

Addresses are written with `{:p}`, so an unbound handle shows up as `0x0`.
Everything other than the addresses is the same on every run.
*/

use std::io::Write;

use crate::entity::{Bar, Foo, FooBar, Identify};
use crate::error::Result;
use crate::handle::handle_exclusive::HandleExclusive;
use crate::handle::handle_shared::HandleShared;

pub const BANNER: &str = "/*----------------------------------------------*/";

/**
Run all three walkthroughs, separated by a banner.
 */
pub fn run(out: &mut impl Write) -> Result<()> {
    let foos = exclusive(out)?;
    banner(out)?;

    shared(out, foos)?;
    banner(out)?;

    weak(out)?;

    Ok(())
}

pub fn banner(out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}\n", BANNER)?;

    Ok(())
}

/**
Allocate a `Foo` and move it from one exclusive handle to another.

Returns both handles: the emptied source and its new owner.
 */
pub fn exclusive(out: &mut impl Write) -> Result<(HandleExclusive<Foo>, HandleExclusive<Foo>)> {
    let mut p1 = HandleExclusive::alloc(Foo::new());
    writeln!(out, "{:p}\n", p1.as_ptr())?;

    let p2 = p1.transfer();
    writeln!(out, "{}", p2.try_as_ref()?.identify())?;

    // p1 no longer owns anything
    writeln!(out, "{:p}", p1.as_ptr())?;
    writeln!(out, "{:p}\n", p2.as_ptr())?;

    Ok((p1, p2))
}

/**
Share a `Bar` between two handles, then release one of them.

The `Foo` handles from `exclusive` are called through here too. The moved-from
one is unbound, so it's skipped with a warning instead of being dereferenced.
 */
pub fn shared(
    out: &mut impl Write,
    (p1, p2): (HandleExclusive<Foo>, HandleExclusive<Foo>),
) -> Result<()> {
    let mut pntr1 = HandleShared::alloc(Bar::new());
    let pntr2 = pntr1.share();

    writeln!(out, "{:p}", pntr1.as_ptr())?;
    writeln!(out, "{:p}\n", pntr2.as_ptr())?;

    for (name, foo) in [("p1", &p1), ("p2", &p2)] {
        match foo.try_as_ref() {
            Ok(foo) => writeln!(out, "{}", foo.identify())?,
            Err(e) => tracing::warn!("skipping {}: {}", name, e),
        }
    }

    writeln!(out, "{}", pntr1.use_count())?;
    writeln!(out, "{}", pntr2.use_count())?;

    pntr1.release();
    writeln!(out, "{:p}", pntr1.as_ptr())?;

    writeln!(out, "{}\n", pntr2.use_count())?;

    Ok(())
}

/**
Observe a `FooBar` through a weak handle and lock it to reach the value.
 */
pub fn weak(out: &mut impl Write) -> Result<()> {
    let pnt1 = HandleShared::alloc(FooBar::new());
    let pnt2 = pnt1.observe();

    // The locked handle is an owner, so let it go before counting
    let line = match pnt2.lock() {
        Some(val) => {
            let line = val.try_as_ref()?.identify();
            Some(line)
        }
        None => None,
    };

    writeln!(out, "{}", pnt1.use_count())?;

    match line {
        Some(line) => writeln!(out, "{}", line)?,
        None => tracing::warn!("FooBar expired before it could be locked"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> Vec<String> {
        let mut out = Vec::new();
        f(&mut out).unwrap();

        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn exclusive_moves_address() {
        let mut handles = None;
        let lines = render(|out| {
            handles = Some(exclusive(out)?);
            Ok(())
        });

        assert_eq!(6, lines.len());
        assert_ne!("0x0", lines[0]);
        assert_eq!("", lines[1]);
        assert_eq!("Foo::prnt()", lines[2]);
        assert_eq!("0x0", lines[3]);
        assert_eq!(lines[0], lines[4]);
        assert_eq!("", lines[5]);

        let (p1, p2) = handles.unwrap();
        assert!(p1.as_ptr().is_null());
        assert_eq!(lines[4], format!("{:p}", p2.as_ptr()));
    }

    #[test]
    fn shared_counts_owners() {
        let mut p1 = HandleExclusive::alloc(Foo::new());
        let p2 = p1.transfer();

        let lines = render(|out| shared(out, (p1, p2)));

        assert_eq!(9, lines.len());
        assert_ne!("0x0", lines[0]);
        assert_eq!(lines[0], lines[1]);
        assert_eq!("", lines[2]);
        assert_eq!("Foo::prnt()", lines[3]);
        assert_eq!("2", lines[4]);
        assert_eq!("2", lines[5]);
        assert_eq!("0x0", lines[6]);
        assert_eq!("1", lines[7]);
        assert_eq!("", lines[8]);
    }

    #[test]
    fn shared_calls_both_bound_handles() {
        let p1 = HandleExclusive::alloc(Foo::new());
        let p2 = HandleExclusive::alloc(Foo::new());

        let lines = render(|out| shared(out, (p1, p2)));

        assert_eq!(
            2,
            lines.iter().filter(|line| *line == "Foo::prnt()").count()
        );
    }

    #[test]
    fn weak_does_not_count() {
        let lines = render(|out| weak(out));

        assert_eq!(vec!["1", "FooBar::print()"], lines);
    }

    #[test]
    fn banner_is_followed_by_a_blank_line() {
        let lines = render(|out| banner(out));

        assert_eq!(vec![BANNER, ""], lines);
    }
}
