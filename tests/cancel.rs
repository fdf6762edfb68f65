#![cfg(feature="db-tests")]

mod tests {
    use ora::*;
    use std::{thread, time::Duration};

    fn open_ses() -> Result<Ses> {
        let dbname = std::env::var("DBNAME").expect("database name");
        let dbuser = std::env::var("DBUSER").expect("user name");
        let dbpass = std::env::var("DBPASS").expect("password");

        let env = drv().open_env()?;
        let srv = env.open_srv(&SrvCfg::new(&dbname))?;
        srv.open_ses(&SesCfg::new(&dbuser, &dbpass))
    }

    #[test]
    fn break_cancels_the_running_call() -> Result<()> {
        let ses = open_ses()?;
        let stmt = ses.prep("BEGIN DBMS_SESSION.SLEEP(10); END;")?;

        let breaker = {
            let ses = ses.clone();
            thread::spawn(move || -> Result<()> {
                thread::sleep(Duration::from_millis(500));
                ses.break_()
            })
        };
        let res = stmt.exe(&mut []);
        breaker.join().expect("break thread")?;

        match res {
            Err(err) => assert_eq!(err.kind(), ErrorKind::Cancelled, "{}", err),
            Ok(_) => panic!("the sleep was not interrupted"),
        }
        assert!(!stmt.is_open());
        assert!(ses.is_open());
        ses.ping()?;

        let rset = ses.prep_and_qry("SELECT 1 FROM dual", &mut [])?;
        let row = rset.next()?.expect("one row");
        assert_eq!(row.get::<i64, _>(0)?, 1);
        Ok(())
    }

    #[test]
    fn closed_statement_after_break() -> Result<()> {
        let ses = open_ses()?;
        let stmt = ses.prep("BEGIN DBMS_SESSION.SLEEP(10); END;")?;
        let breaker = {
            let ses = ses.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(500));
                ses.break_()
            })
        };
        let _ = stmt.exe(&mut []);
        breaker.join().expect("break thread")?;

        let res = stmt.exe(&mut []);
        assert!(matches!(res, Err(ref err) if err.kind() == ErrorKind::Protocol));
        assert_eq!(ses.num_stmt(), 0);
        Ok(())
    }
}
