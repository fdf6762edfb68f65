#![cfg(feature="db-tests")]

mod tests {
    use ora::*;
    use std::io::Read;

    fn open_ses() -> Result<Ses> {
        let dbname = std::env::var("DBNAME").expect("database name");
        let dbuser = std::env::var("DBUSER").expect("user name");
        let dbpass = std::env::var("DBPASS").expect("password");

        let env = drv().open_env()?;
        let srv = env.open_srv(&SrvCfg::new(&dbname))?;
        srv.open_ses(&SesCfg::new(&dbuser, &dbpass))
    }

    fn recreate(ses: &Ses, name: &str) -> Result<()> {
        ses.prep_and_exe(&format!("
            BEGIN
                EXECUTE IMMEDIATE 'DROP TABLE {}';
            EXCEPTION
                WHEN OTHERS THEN
                    IF sqlcode != -942 THEN
                        RAISE;
                    END IF;
            END;
        ", name), &mut [])?;
        ses.prep_and_exe(&format!("CREATE TABLE {} (id NUMBER(9), text CLOB, data BLOB)", name), &mut [])?;
        Ok(())
    }

    #[test]
    fn next_while_lob_is_open() -> Result<()> {
        let ses = open_ses()?;
        recreate(&ses, "test_lob_guard")?;
        let stmt = ses.prep("INSERT INTO test_lob_guard (id, text) VALUES (:1, :2)")?;
        stmt.exe(&mut [1.into(), Arg::lob(LobSrc::Text("first".into()))])?;
        stmt.exe(&mut [2.into(), Arg::lob(LobSrc::Text("second".into()))])?;

        let stmt = ses.prep("SELECT id, text FROM test_lob_guard ORDER BY id")?;
        stmt.set_gcts(vec![ColumnType::I64, ColumnType::Lob]);
        let rset = stmt.qry(&mut [])?;

        let mut row = rset.next()?.expect("first row");
        let mut lob = row.take(1).into_lob()?;
        assert!(lob.is_clob());
        assert!(lob.is_open());

        let res = rset.next();
        assert!(matches!(res, Err(ref err) if err.kind() == ErrorKind::Protocol));
        assert!(rset.is_open());

        let mut text = String::new();
        lob.read_to_string(&mut text).expect("LOB text");
        assert_eq!(text, "first");
        lob.close()?;

        let row = rset.next()?.expect("second row");
        assert_eq!(row.get::<i64, _>(0)?, 2);
        Ok(())
    }

    #[test]
    fn lob_sources() -> Result<()> {
        let ses = open_ses()?;
        recreate(&ses, "test_lob_src")?;

        let blob : Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let text = "ü".repeat(70_000);
        ses.prep_and_exe("INSERT INTO test_lob_src (id, text, data) VALUES (:1, :2, :3)", &mut [
            1.into(),
            Arg::lob(LobSrc::reader(std::io::Cursor::new(text.clone().into_bytes()), true)),
            Arg::lob(LobSrc::Bytes(blob.clone())),
        ])?;

        let rset = ses.prep_and_qry("SELECT text, data FROM test_lob_src", &mut [])?;
        let row = rset.next()?.expect("one row");
        assert_eq!(row.get::<String, _>(0)?, text);
        assert_eq!(row.get::<Vec<u8>, _>(1)?, blob);
        Ok(())
    }
}
